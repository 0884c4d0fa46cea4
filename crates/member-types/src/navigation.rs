//! Per-role member navigation.

use crate::RoleTag;
use serde::Serialize;

/// One navigation link in the member area.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct NavEntry {
    pub label: &'static str,
    pub path: &'static str,
}

const GAMES: NavEntry = NavEntry { label: "Games", path: "/games" };
const MENTORS: NavEntry = NavEntry { label: "Mentors", path: "/mentorship" };
const INTERNSHIPS: NavEntry = NavEntry { label: "Internships", path: "/internships" };
const COURSES: NavEntry = NavEntry { label: "Courses", path: "/courses" };
const PROFILE: NavEntry = NavEntry { label: "Profile", path: "/profile" };

/// Navigation for a role. Profile is always last.
pub fn navigation_for(role: RoleTag) -> Vec<NavEntry> {
    let mut entries = match role {
        RoleTag::School => vec![GAMES, MENTORS],
        RoleTag::College => vec![INTERNSHIPS, COURSES],
        RoleTag::Professional => vec![COURSES, MENTORS],
    };
    entries.push(PROFILE);
    entries
}
