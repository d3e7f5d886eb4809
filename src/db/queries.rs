use anyhow::Context;
use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use rusqlite::{params, Connection};

use crate::models::{
    Appointment, AppointmentStatus, AvailabilityWindow, Clinic, Doctor, DoctorQualification,
    DoctorReview, DoctorWorkExperience, PatientProfile, PendingSignup, Specialty, User, DATE_FMT,
    DATETIME_FMT, TIME_FMT,
};

/// True when an insert/update failed because it would break a UNIQUE
/// constraint (duplicate username/email, or an already-taken appointment slot).
pub fn is_unique_violation(e: &anyhow::Error) -> bool {
    matches!(
        e.downcast_ref::<rusqlite::Error>(),
        Some(rusqlite::Error::SqliteFailure(f, _)) if f.code == rusqlite::ErrorCode::ConstraintViolation
    )
}

// ── Users & Tokens ──

pub fn create_user(
    conn: &Connection,
    id: &str,
    username: &str,
    email: &str,
    password_hash: &str,
) -> anyhow::Result<()> {
    conn.execute(
        "INSERT INTO users (id, username, email, password_hash) VALUES (?1, ?2, ?3, ?4)",
        params![id, username, email, password_hash],
    )?;
    Ok(())
}

fn parse_user_row(row: &rusqlite::Row) -> anyhow::Result<User> {
    Ok(User {
        id: row.get(0)?,
        username: row.get(1)?,
        email: row.get(2)?,
        password_hash: row.get(3)?,
    })
}

pub fn get_user_by_username(conn: &Connection, username: &str) -> anyhow::Result<Option<User>> {
    let result = conn.query_row(
        "SELECT id, username, email, password_hash FROM users WHERE username = ?1",
        params![username],
        |row| Ok(parse_user_row(row)),
    );

    match result {
        Ok(user) => Ok(Some(user?)),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(e.into()),
    }
}

pub fn get_user_by_id(conn: &Connection, id: &str) -> anyhow::Result<Option<User>> {
    let result = conn.query_row(
        "SELECT id, username, email, password_hash FROM users WHERE id = ?1",
        params![id],
        |row| Ok(parse_user_row(row)),
    );

    match result {
        Ok(user) => Ok(Some(user?)),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(e.into()),
    }
}

pub fn username_taken(conn: &Connection, username: &str) -> anyhow::Result<bool> {
    let count: i64 = conn.query_row(
        "SELECT COUNT(*) FROM users WHERE username = ?1",
        params![username],
        |row| row.get(0),
    )?;
    Ok(count > 0)
}

pub fn email_taken(conn: &Connection, email: &str) -> anyhow::Result<bool> {
    let count: i64 = conn.query_row(
        "SELECT COUNT(*) FROM users WHERE email = ?1",
        params![email],
        |row| row.get(0),
    )?;
    Ok(count > 0)
}

pub fn update_user_email(conn: &Connection, user_id: &str, email: &str) -> anyhow::Result<()> {
    conn.execute(
        "UPDATE users SET email = ?1 WHERE id = ?2",
        params![email, user_id],
    )?;
    Ok(())
}

pub fn insert_token(conn: &Connection, token: &str, user_id: &str) -> anyhow::Result<()> {
    conn.execute(
        "INSERT INTO auth_tokens (token, user_id) VALUES (?1, ?2)",
        params![token, user_id],
    )?;
    Ok(())
}

pub fn get_token_for_user(conn: &Connection, user_id: &str) -> anyhow::Result<Option<String>> {
    let result = conn.query_row(
        "SELECT token FROM auth_tokens WHERE user_id = ?1",
        params![user_id],
        |row| row.get::<_, String>(0),
    );

    match result {
        Ok(token) => Ok(Some(token)),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(e.into()),
    }
}

pub fn get_user_by_token(conn: &Connection, token: &str) -> anyhow::Result<Option<User>> {
    let result = conn.query_row(
        "SELECT u.id, u.username, u.email, u.password_hash
         FROM users u INNER JOIN auth_tokens t ON t.user_id = u.id
         WHERE t.token = ?1",
        params![token],
        |row| Ok(parse_user_row(row)),
    );

    match result {
        Ok(user) => Ok(Some(user?)),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(e.into()),
    }
}

// ── Patient Profiles ──

pub fn create_patient_profile(conn: &Connection, profile: &PatientProfile) -> anyhow::Result<()> {
    conn.execute(
        "INSERT INTO patient_profiles (user_id, full_name, birthdate, phone, gender, address)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        params![
            profile.user_id,
            profile.full_name,
            profile.birthdate.format(DATE_FMT).to_string(),
            profile.phone,
            profile.gender,
            profile.address,
        ],
    )?;
    Ok(())
}

pub fn get_patient_profile(
    conn: &Connection,
    user_id: &str,
) -> anyhow::Result<Option<PatientProfile>> {
    let result = conn.query_row(
        "SELECT user_id, full_name, birthdate, phone, gender, address
         FROM patient_profiles WHERE user_id = ?1",
        params![user_id],
        |row| {
            Ok((
                row.get::<_, String>(0)?,
                row.get::<_, String>(1)?,
                row.get::<_, String>(2)?,
                row.get::<_, String>(3)?,
                row.get::<_, String>(4)?,
                row.get::<_, Option<String>>(5)?,
            ))
        },
    );

    match result {
        Ok((user_id, full_name, birthdate_str, phone, gender, address)) => {
            let birthdate = NaiveDate::parse_from_str(&birthdate_str, DATE_FMT)
                .with_context(|| format!("invalid birthdate in profile row: {birthdate_str}"))?;
            Ok(Some(PatientProfile {
                user_id,
                full_name,
                birthdate,
                phone,
                gender,
                address,
            }))
        }
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(e.into()),
    }
}

pub fn update_patient_contact(
    conn: &Connection,
    user_id: &str,
    phone: Option<&str>,
    address: Option<&str>,
) -> anyhow::Result<()> {
    if let Some(phone) = phone {
        conn.execute(
            "UPDATE patient_profiles SET phone = ?1 WHERE user_id = ?2",
            params![phone, user_id],
        )?;
    }
    if let Some(address) = address {
        conn.execute(
            "UPDATE patient_profiles SET address = ?1 WHERE user_id = ?2",
            params![address, user_id],
        )?;
    }
    Ok(())
}

// ── Pending Signups ──

pub fn upsert_pending_signup(
    conn: &Connection,
    pending: &PendingSignup,
    code: &str,
    expires_at: &NaiveDateTime,
) -> anyhow::Result<()> {
    let payload = serde_json::to_string(pending)?;
    let expires_at = expires_at.format(DATETIME_FMT).to_string();

    conn.execute(
        "INSERT INTO pending_signups (email, payload, code, expires_at)
         VALUES (?1, ?2, ?3, ?4)
         ON CONFLICT(email) DO UPDATE SET
           payload = excluded.payload,
           code = excluded.code,
           created_at = datetime('now'),
           expires_at = excluded.expires_at",
        params![pending.email, payload, code, expires_at],
    )?;
    Ok(())
}

/// Returns the pending signup and its code, ignoring rows past `now`.
pub fn get_pending_signup(
    conn: &Connection,
    email: &str,
    now: &NaiveDateTime,
) -> anyhow::Result<Option<(PendingSignup, String)>> {
    let now = now.format(DATETIME_FMT).to_string();
    let result = conn.query_row(
        "SELECT payload, code FROM pending_signups WHERE email = ?1 AND expires_at > ?2",
        params![email, now],
        |row| Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?)),
    );

    match result {
        Ok((payload, code)) => {
            let pending: PendingSignup = serde_json::from_str(&payload)
                .context("invalid pending signup payload")?;
            Ok(Some((pending, code)))
        }
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(e.into()),
    }
}

pub fn delete_pending_signup(conn: &Connection, email: &str) -> anyhow::Result<()> {
    conn.execute(
        "DELETE FROM pending_signups WHERE email = ?1",
        params![email],
    )?;
    Ok(())
}

pub fn expire_old_pending_signups(
    conn: &Connection,
    now: &NaiveDateTime,
) -> anyhow::Result<usize> {
    let now = now.format(DATETIME_FMT).to_string();
    let count = conn.execute(
        "DELETE FROM pending_signups WHERE expires_at <= ?1",
        params![now],
    )?;
    Ok(count)
}

pub fn record_email_verification(
    conn: &Connection,
    user_id: &str,
    code: &str,
) -> anyhow::Result<()> {
    conn.execute(
        "INSERT INTO email_verifications (user_id, code, verified) VALUES (?1, ?2, 1)",
        params![user_id, code],
    )?;
    Ok(())
}

// ── Clinics & Specialties ──

pub fn create_clinic(conn: &Connection, clinic: &Clinic) -> anyhow::Result<()> {
    conn.execute(
        "INSERT INTO clinics (id, name, contacts, address) VALUES (?1, ?2, ?3, ?4)",
        params![clinic.id, clinic.name, clinic.contacts, clinic.address],
    )?;
    Ok(())
}

pub fn list_clinics(conn: &Connection) -> anyhow::Result<Vec<Clinic>> {
    let mut stmt =
        conn.prepare("SELECT id, name, contacts, address FROM clinics ORDER BY name ASC")?;

    let rows = stmt.query_map([], |row| {
        Ok(Clinic {
            id: row.get(0)?,
            name: row.get(1)?,
            contacts: row.get(2)?,
            address: row.get(3)?,
        })
    })?;

    let mut clinics = vec![];
    for row in rows {
        clinics.push(row?);
    }
    Ok(clinics)
}

pub fn create_specialty(conn: &Connection, specialty: &Specialty) -> anyhow::Result<()> {
    conn.execute(
        "INSERT INTO specialties (id, name) VALUES (?1, ?2)",
        params![specialty.id, specialty.name],
    )?;
    Ok(())
}

pub fn get_specialty(conn: &Connection, id: &str) -> anyhow::Result<Option<Specialty>> {
    let result = conn.query_row(
        "SELECT id, name FROM specialties WHERE id = ?1",
        params![id],
        |row| {
            Ok(Specialty {
                id: row.get(0)?,
                name: row.get(1)?,
            })
        },
    );

    match result {
        Ok(specialty) => Ok(Some(specialty)),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(e.into()),
    }
}

// ── Doctors ──

pub fn create_doctor(conn: &Connection, doctor: &Doctor) -> anyhow::Result<()> {
    conn.execute(
        "INSERT INTO doctors (id, user_id, full_name, birthdate, phone, license_no, clinic_id, specialty_id)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
        params![
            doctor.id,
            doctor.user_id,
            doctor.full_name,
            doctor.birthdate.format(DATE_FMT).to_string(),
            doctor.phone,
            doctor.license_no,
            doctor.clinic_id,
            doctor.specialty_id,
        ],
    )?;
    Ok(())
}

fn parse_doctor_row(row: &rusqlite::Row) -> anyhow::Result<Doctor> {
    let birthdate_str: String = row.get(3)?;
    let birthdate = NaiveDate::parse_from_str(&birthdate_str, DATE_FMT)
        .with_context(|| format!("invalid birthdate in doctor row: {birthdate_str}"))?;

    Ok(Doctor {
        id: row.get(0)?,
        user_id: row.get(1)?,
        full_name: row.get(2)?,
        birthdate,
        phone: row.get(4)?,
        license_no: row.get(5)?,
        clinic_id: row.get(6)?,
        specialty_id: row.get(7)?,
    })
}

pub fn get_doctor_by_id(conn: &Connection, id: &str) -> anyhow::Result<Option<Doctor>> {
    let result = conn.query_row(
        "SELECT id, user_id, full_name, birthdate, phone, license_no, clinic_id, specialty_id
         FROM doctors WHERE id = ?1",
        params![id],
        |row| Ok(parse_doctor_row(row)),
    );

    match result {
        Ok(doctor) => Ok(Some(doctor?)),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(e.into()),
    }
}

pub fn get_doctors_for_clinic(conn: &Connection, clinic_id: &str) -> anyhow::Result<Vec<Doctor>> {
    let mut stmt = conn.prepare(
        "SELECT id, user_id, full_name, birthdate, phone, license_no, clinic_id, specialty_id
         FROM doctors WHERE clinic_id = ?1 ORDER BY full_name ASC",
    )?;

    let rows = stmt.query_map(params![clinic_id], |row| Ok(parse_doctor_row(row)))?;

    let mut doctors = vec![];
    for row in rows {
        doctors.push(row??);
    }
    Ok(doctors)
}

pub fn get_clinic(conn: &Connection, id: &str) -> anyhow::Result<Option<Clinic>> {
    let result = conn.query_row(
        "SELECT id, name, contacts, address FROM clinics WHERE id = ?1",
        params![id],
        |row| {
            Ok(Clinic {
                id: row.get(0)?,
                name: row.get(1)?,
                contacts: row.get(2)?,
                address: row.get(3)?,
            })
        },
    );

    match result {
        Ok(clinic) => Ok(Some(clinic)),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(e.into()),
    }
}

pub fn add_qualification(
    conn: &Connection,
    qualification: &DoctorQualification,
) -> anyhow::Result<()> {
    conn.execute(
        "INSERT INTO doctor_qualifications (doctor_id, qualification, institution, year_obtained)
         VALUES (?1, ?2, ?3, ?4)",
        params![
            qualification.doctor_id,
            qualification.qualification,
            qualification.institution,
            qualification.year_obtained,
        ],
    )?;
    Ok(())
}

pub fn get_qualifications(
    conn: &Connection,
    doctor_id: &str,
) -> anyhow::Result<Vec<DoctorQualification>> {
    let mut stmt = conn.prepare(
        "SELECT doctor_id, qualification, institution, year_obtained
         FROM doctor_qualifications WHERE doctor_id = ?1 ORDER BY year_obtained ASC",
    )?;

    let rows = stmt.query_map(params![doctor_id], |row| {
        Ok(DoctorQualification {
            doctor_id: row.get(0)?,
            qualification: row.get(1)?,
            institution: row.get(2)?,
            year_obtained: row.get(3)?,
        })
    })?;

    let mut qualifications = vec![];
    for row in rows {
        qualifications.push(row?);
    }
    Ok(qualifications)
}

pub fn add_work_experience(
    conn: &Connection,
    experience: &DoctorWorkExperience,
) -> anyhow::Result<()> {
    conn.execute(
        "INSERT INTO doctor_work_experience (doctor_id, place_of_experience, start_year, end_year, position, description)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        params![
            experience.doctor_id,
            experience.place_of_experience,
            experience.start_year,
            experience.end_year,
            experience.position,
            experience.description,
        ],
    )?;
    Ok(())
}

pub fn get_work_experience(
    conn: &Connection,
    doctor_id: &str,
) -> anyhow::Result<Vec<DoctorWorkExperience>> {
    let mut stmt = conn.prepare(
        "SELECT doctor_id, place_of_experience, start_year, end_year, position, description
         FROM doctor_work_experience WHERE doctor_id = ?1 ORDER BY start_year ASC",
    )?;

    let rows = stmt.query_map(params![doctor_id], |row| {
        Ok(DoctorWorkExperience {
            doctor_id: row.get(0)?,
            place_of_experience: row.get(1)?,
            start_year: row.get(2)?,
            end_year: row.get(3)?,
            position: row.get(4)?,
            description: row.get(5)?,
        })
    })?;

    let mut experiences = vec![];
    for row in rows {
        experiences.push(row?);
    }
    Ok(experiences)
}

pub fn add_review(conn: &Connection, review: &DoctorReview) -> anyhow::Result<()> {
    conn.execute(
        "INSERT INTO doctor_reviews (doctor_id, rating, review) VALUES (?1, ?2, ?3)",
        params![review.doctor_id, review.rating, review.review],
    )?;
    Ok(())
}

pub fn get_reviews(conn: &Connection, doctor_id: &str) -> anyhow::Result<Vec<DoctorReview>> {
    let mut stmt = conn.prepare(
        "SELECT doctor_id, rating, review FROM doctor_reviews WHERE doctor_id = ?1 ORDER BY id ASC",
    )?;

    let rows = stmt.query_map(params![doctor_id], |row| {
        Ok(DoctorReview {
            doctor_id: row.get(0)?,
            rating: row.get(1)?,
            review: row.get(2)?,
        })
    })?;

    let mut reviews = vec![];
    for row in rows {
        reviews.push(row?);
    }
    Ok(reviews)
}

// ── Availability Windows ──

pub fn add_availability_window(
    conn: &Connection,
    window: &AvailabilityWindow,
) -> anyhow::Result<()> {
    conn.execute(
        "INSERT INTO doctor_availability (doctor_id, day_of_week, start_time, end_time)
         VALUES (?1, ?2, ?3, ?4)",
        params![
            window.doctor_id,
            window.day_of_week,
            window.start_time.format(TIME_FMT).to_string(),
            window.end_time.format(TIME_FMT).to_string(),
        ],
    )?;
    Ok(())
}

fn parse_window_row(row: &rusqlite::Row) -> anyhow::Result<AvailabilityWindow> {
    let start_str: String = row.get(2)?;
    let end_str: String = row.get(3)?;

    let start_time = NaiveTime::parse_from_str(&start_str, TIME_FMT)
        .with_context(|| format!("invalid start time in availability row: {start_str}"))?;
    let end_time = NaiveTime::parse_from_str(&end_str, TIME_FMT)
        .with_context(|| format!("invalid end time in availability row: {end_str}"))?;

    Ok(AvailabilityWindow {
        doctor_id: row.get(0)?,
        day_of_week: row.get(1)?,
        start_time,
        end_time,
    })
}

pub fn get_doctor_availability(
    conn: &Connection,
    doctor_id: &str,
) -> anyhow::Result<Vec<AvailabilityWindow>> {
    let mut stmt = conn.prepare(
        "SELECT doctor_id, day_of_week, start_time, end_time
         FROM doctor_availability WHERE doctor_id = ?1
         ORDER BY day_of_week ASC, start_time ASC",
    )?;

    let rows = stmt.query_map(params![doctor_id], |row| Ok(parse_window_row(row)))?;

    let mut windows = vec![];
    for row in rows {
        windows.push(row??);
    }
    Ok(windows)
}

// ── Appointments ──

pub fn create_appointment(conn: &Connection, appointment: &Appointment) -> anyhow::Result<()> {
    conn.execute(
        "INSERT INTO appointments (id, patient_id, doctor_id, date, start_time, end_time, status, created_at, updated_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
        params![
            appointment.id,
            appointment.patient_id,
            appointment.doctor_id,
            appointment.date.format(DATE_FMT).to_string(),
            appointment.start_time.format(TIME_FMT).to_string(),
            appointment.end_time.format(TIME_FMT).to_string(),
            appointment.status.as_str(),
            appointment.created_at.format(DATETIME_FMT).to_string(),
            appointment.updated_at.format(DATETIME_FMT).to_string(),
        ],
    )?;
    Ok(())
}

fn parse_appointment_row(row: &rusqlite::Row) -> anyhow::Result<Appointment> {
    let date_str: String = row.get(3)?;
    let start_str: String = row.get(4)?;
    let end_str: String = row.get(5)?;
    let status_str: String = row.get(6)?;
    let created_at_str: String = row.get(7)?;
    let updated_at_str: String = row.get(8)?;

    let date = NaiveDate::parse_from_str(&date_str, DATE_FMT)
        .with_context(|| format!("invalid date in appointment row: {date_str}"))?;
    let start_time = NaiveTime::parse_from_str(&start_str, TIME_FMT)
        .with_context(|| format!("invalid start time in appointment row: {start_str}"))?;
    let end_time = NaiveTime::parse_from_str(&end_str, TIME_FMT)
        .with_context(|| format!("invalid end time in appointment row: {end_str}"))?;
    let created_at = NaiveDateTime::parse_from_str(&created_at_str, DATETIME_FMT)
        .with_context(|| format!("invalid created_at in appointment row: {created_at_str}"))?;
    let updated_at = NaiveDateTime::parse_from_str(&updated_at_str, DATETIME_FMT)
        .with_context(|| format!("invalid updated_at in appointment row: {updated_at_str}"))?;

    Ok(Appointment {
        id: row.get(0)?,
        patient_id: row.get(1)?,
        doctor_id: row.get(2)?,
        date,
        start_time,
        end_time,
        status: AppointmentStatus::parse(&status_str),
        created_at,
        updated_at,
    })
}

pub fn get_appointment_by_id(conn: &Connection, id: &str) -> anyhow::Result<Option<Appointment>> {
    let result = conn.query_row(
        "SELECT id, patient_id, doctor_id, date, start_time, end_time, status, created_at, updated_at
         FROM appointments WHERE id = ?1",
        params![id],
        |row| Ok(parse_appointment_row(row)),
    );

    match result {
        Ok(appointment) => Ok(Some(appointment?)),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(e.into()),
    }
}

pub fn get_appointments_for_patient(
    conn: &Connection,
    patient_id: &str,
) -> anyhow::Result<Vec<Appointment>> {
    let mut stmt = conn.prepare(
        "SELECT id, patient_id, doctor_id, date, start_time, end_time, status, created_at, updated_at
         FROM appointments WHERE patient_id = ?1 ORDER BY date ASC, start_time ASC",
    )?;

    let rows = stmt.query_map(params![patient_id], |row| Ok(parse_appointment_row(row)))?;

    let mut appointments = vec![];
    for row in rows {
        appointments.push(row??);
    }
    Ok(appointments)
}

pub fn update_appointment(conn: &Connection, appointment: &Appointment) -> anyhow::Result<bool> {
    let count = conn.execute(
        "UPDATE appointments
         SET date = ?1, start_time = ?2, end_time = ?3, status = ?4, updated_at = ?5
         WHERE id = ?6",
        params![
            appointment.date.format(DATE_FMT).to_string(),
            appointment.start_time.format(TIME_FMT).to_string(),
            appointment.end_time.format(TIME_FMT).to_string(),
            appointment.status.as_str(),
            appointment.updated_at.format(DATETIME_FMT).to_string(),
            appointment.id,
        ],
    )?;
    Ok(count > 0)
}
