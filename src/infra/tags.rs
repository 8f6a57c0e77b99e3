use crate::domain::TagGenerator;
use uuid::Uuid;

/// Random 32-character hex tags, unique per build
#[derive(Debug, Default, Clone, Copy)]
pub struct RandomTagGenerator;

impl RandomTagGenerator {
    pub fn new() -> Self {
        Self
    }
}

impl TagGenerator for RandomTagGenerator {
    fn generate(&self) -> String {
        Uuid::new_v4().simple().to_string()
    }
}
