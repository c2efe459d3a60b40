use serde::{Deserialize, Serialize};

use tabsettle_core::{Entity, MemberId};

/// A participant in a group's shared expenses.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Member {
    id: MemberId,
    name: String,
}

impl Member {
    pub fn new(name: impl Into<String>) -> Self {
        Self::with_id(MemberId::new(), name)
    }

    pub fn with_id(id: MemberId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
        }
    }

    pub fn id_typed(&self) -> MemberId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

impl Entity for Member {
    type Id = MemberId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}
