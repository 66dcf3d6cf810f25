//! Job DTOs

use serde::{Deserialize, Serialize};

/// Request to schedule a new job from its XML description
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubmitJob {
    pub job_xml: String,
}
