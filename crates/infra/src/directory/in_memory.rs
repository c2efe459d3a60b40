use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use tracing::{info, instrument};

use tabsettle_core::GroupId;
use tabsettle_settlement::{Group, Member};

use super::r#trait::{DirectoryError, DirectoryResult, GroupDirectory};
use crate::config::DirectoryConfig;

/// In-memory group directory.
///
/// Groups are independent of one another: the registry lock is held only to
/// find or insert an `Arc<Group>`, never while a group operation runs.
#[derive(Debug, Default)]
pub struct InMemoryGroupDirectory {
    config: DirectoryConfig,
    groups: RwLock<HashMap<GroupId, Arc<Group>>>,
}

impl InMemoryGroupDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: DirectoryConfig) -> Self {
        Self {
            config,
            groups: RwLock::new(HashMap::new()),
        }
    }

    pub fn config(&self) -> &DirectoryConfig {
        &self.config
    }
}

impl GroupDirectory for InMemoryGroupDirectory {
    #[instrument(skip(self, members), fields(member_count = members.len()))]
    fn create_group(&self, name: &str, members: Vec<Member>) -> DirectoryResult<Arc<Group>> {
        let group = Group::with_id_salt(name, members, &self.config.group_id_salt)?;
        let group_id = group.id_typed();

        let mut groups = self.groups.write().map_err(|_| DirectoryError::Poisoned)?;
        if let Some(existing) = groups.get(&group_id) {
            return Ok(Arc::clone(existing));
        }

        let group = Arc::new(group);
        groups.insert(group_id, Arc::clone(&group));
        info!(group_id = %group_id, "group created");
        Ok(group)
    }

    fn get(&self, group_id: GroupId) -> DirectoryResult<Option<Arc<Group>>> {
        let groups = self.groups.read().map_err(|_| DirectoryError::Poisoned)?;
        Ok(groups.get(&group_id).cloned())
    }

    fn len(&self) -> DirectoryResult<usize> {
        let groups = self.groups.read().map_err(|_| DirectoryError::Poisoned)?;
        Ok(groups.len())
    }
}
