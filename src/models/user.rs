/// A confirmed account. Rows only come into existence after the email
/// verification code has been entered; unconfirmed signups live in
/// `pending_signups` instead.
#[derive(Debug, Clone)]
pub struct User {
    pub id: String,
    pub username: String,
    pub email: String,
    pub password_hash: String,
}
