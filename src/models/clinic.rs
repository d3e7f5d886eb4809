#[derive(Debug, Clone)]
pub struct Clinic {
    pub id: String,
    pub name: String,
    pub contacts: String,
    pub address: String,
}
