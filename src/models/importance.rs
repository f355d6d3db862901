use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
pub enum Importance {
    High,
    #[default]
    Medium,
    Low,
}

impl Importance {
    /// Display order used by grouped lists.
    pub const ORDER: [Importance; 3] = [Importance::High, Importance::Medium, Importance::Low];
}
