//! UID resolution with an optional user allow-list.
//!
//! `/etc/passwd` is parsed once at startup into a UID-keyed map, so the
//! per-tick lookups the monitor issues for every PID are O(1). Malformed
//! passwd lines are skipped rather than rejected; real systems carry them.

use std::collections::{HashMap, HashSet};
use std::io;

/// Outcome of resolving a UID.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UserLookup<'a> {
    /// A known user.
    User(&'a str),
    /// The UID resolves, but falls outside the configured allow-list; the
    /// monitor skips such processes entirely.
    NotWhitelisted,
    /// No passwd entry for this UID.
    Unknown,
}

/// UID to username table with an optional allow-list.
#[derive(Debug, Clone, Default)]
pub struct UserTable {
    by_uid: HashMap<u32, String>,
    by_name: HashMap<String, u32>,
    allowed: Option<HashSet<u32>>,
}

impl UserTable {
    /// Parses passwd-format content (`name:x:uid:gid:gecos:home:shell`).
    pub fn from_passwd(content: &str) -> Self {
        let mut by_uid = HashMap::new();
        let mut by_name = HashMap::new();
        for line in content.lines() {
            let mut fields = line.split(':');
            let (Some(name), _, Some(uid)) = (fields.next(), fields.next(), fields.next()) else {
                continue;
            };
            let Ok(uid) = uid.parse::<u32>() else {
                continue;
            };
            by_uid.insert(uid, name.to_string());
            by_name.insert(name.to_string(), uid);
        }
        Self {
            by_uid,
            by_name,
            allowed: None,
        }
    }

    /// Loads the system passwd database.
    pub fn load_system() -> io::Result<Self> {
        Ok(Self::from_passwd(&std::fs::read_to_string("/etc/passwd")?))
    }

    /// Restricts lookups to the named users. Fails with the offending name
    /// when one does not exist, for flag validation.
    pub fn restrict_to<'n>(&mut self, names: impl IntoIterator<Item = &'n str>) -> Result<(), String> {
        let mut allowed = HashSet::new();
        for name in names {
            match self.by_name.get(name) {
                Some(&uid) => {
                    allowed.insert(uid);
                }
                None => return Err(name.to_string()),
            }
        }
        self.allowed = Some(allowed);
        Ok(())
    }

    /// Resolves a UID.
    pub fn lookup(&self, uid: u32) -> UserLookup<'_> {
        if let Some(allowed) = &self.allowed
            && !allowed.contains(&uid)
        {
            return UserLookup::NotWhitelisted;
        }
        match self.by_uid.get(&uid) {
            Some(name) => UserLookup::User(name),
            None => UserLookup::Unknown,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collector::mock::scenarios::PASSWD;

    #[test]
    fn resolves_known_uids() {
        let table = UserTable::from_passwd(PASSWD);
        assert_eq!(table.lookup(0), UserLookup::User("root"));
        assert_eq!(table.lookup(1000), UserLookup::User("justin"));
        assert_eq!(table.lookup(9999), UserLookup::Unknown);
    }

    #[test]
    fn skips_malformed_lines() {
        let table = UserTable::from_passwd("broken line\nroot:x:0:0::/root:/bin/sh\nnouid:x:abc:1::/:/bin/sh\n");
        assert_eq!(table.lookup(0), UserLookup::User("root"));
    }

    #[test]
    fn allow_list_hides_other_users() {
        let mut table = UserTable::from_passwd(PASSWD);
        table.restrict_to(["justin"]).unwrap();

        assert_eq!(table.lookup(1000), UserLookup::User("justin"));
        assert_eq!(table.lookup(0), UserLookup::NotWhitelisted);
        // Unknown UIDs are outside the list too.
        assert_eq!(table.lookup(9999), UserLookup::NotWhitelisted);
    }

    #[test]
    fn restrict_to_reports_missing_user() {
        let mut table = UserTable::from_passwd(PASSWD);
        assert_eq!(table.restrict_to(["nobody-here"]), Err("nobody-here".to_string()));
    }
}
