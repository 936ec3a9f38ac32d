/// The single college-wide settings document
#[derive(Debug, Clone, PartialEq)]
pub struct CollegeSettings {
    pub college_name: String,
    pub address: String,
    pub email: String,
    pub phone: String,
}

impl Default for CollegeSettings {
    fn default() -> Self {
        Self {
            college_name: "College Management System".to_string(),
            address: String::new(),
            email: String::new(),
            phone: String::new(),
        }
    }
}
