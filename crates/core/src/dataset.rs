//! Seeded demo dataset and the in-memory query engine over it.
//!
//! Two generations with the same seed produce identical directories, which
//! keeps the reference backend reproducible across restarts.

use rand::prelude::IndexedRandom;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};

use crate::filter::FilterCriteria;
use crate::pagination::{paginate, ResultPage};
use crate::user::User;

// ---------------------------------------------------------------------------
// Static pools
// ---------------------------------------------------------------------------

/// Nationalities offered by the filter panel.
pub const NATIONALITIES: &[&str] = &[
    "American",
    "British",
    "Canadian",
    "German",
    "French",
    "Japanese",
    "Australian",
    "Brazilian",
    "Indian",
    "Italian",
    "Spanish",
    "Swedish",
    "Chinese",
    "Mexican",
    "Dutch",
];

/// Hobbies offered by the filter panel.
pub const HOBBIES: &[&str] = &[
    "Photography",
    "Gardening",
    "Cooking",
    "Hiking",
    "Painting",
    "Reading",
    "Swimming",
    "Coding",
    "Chess",
    "Yoga",
    "Gaming",
    "Astronomy",
    "Knitting",
    "Fishing",
    "Singing",
    "Dancing",
    "Pottery",
    "Traveling",
    "Biking",
    "Surfing",
];

const FIRST_NAMES: &[&str] = &[
    "James",
    "Mary",
    "Robert",
    "Patricia",
    "John",
    "Jennifer",
    "Michael",
    "Linda",
    "William",
    "Elizabeth",
    "David",
    "Barbara",
    "Richard",
    "Susan",
    "Joseph",
    "Jessica",
    "Thomas",
    "Sarah",
    "Charles",
    "Karen",
    "Christopher",
    "Nancy",
    "Daniel",
    "Lisa",
];

const LAST_NAMES: &[&str] = &[
    "Smith",
    "Johnson",
    "Williams",
    "Brown",
    "Jones",
    "Garcia",
    "Miller",
    "Davis",
    "Rodriguez",
    "Martinez",
    "Hernandez",
    "Lopez",
    "Gonzalez",
    "Wilson",
    "Anderson",
    "Thomas",
];

/// Youngest generated member.
const MIN_GENERATED_AGE: u32 = 18;

/// Oldest generated member.
const MAX_GENERATED_AGE: u32 = 77;

/// Upper bound on hobbies per generated member.
const MAX_HOBBIES: usize = 10;

/// Number of members the reference backend serves by default.
pub const DEFAULT_DATASET_SIZE: usize = 500;

// ---------------------------------------------------------------------------
// Generation
// ---------------------------------------------------------------------------

/// Generate `count` members deterministically from `seed`.
///
/// Ids and avatar seeds are 1-based (`user-1`, `user-2`, ...).
pub fn generate_users(count: usize, seed: u64) -> Vec<User> {
    let mut rng = StdRng::seed_from_u64(seed);
    (1..=count).map(|n| generate_user(&mut rng, n)).collect()
}

fn generate_user(rng: &mut StdRng, n: usize) -> User {
    let first_name = pick(rng, FIRST_NAMES);
    let last_name = pick(rng, LAST_NAMES);
    let nationality = pick(rng, NATIONALITIES);

    let hobby_count = rng.random_range(0..=MAX_HOBBIES);
    let mut pool: Vec<&str> = HOBBIES.to_vec();
    pool.shuffle(rng);
    let hobbies = pool
        .into_iter()
        .take(hobby_count)
        .map(str::to_string)
        .collect();

    User {
        id: format!("user-{n}"),
        avatar: format!("https://picsum.photos/seed/{n}/200"),
        first_name,
        last_name,
        age: rng.random_range(MIN_GENERATED_AGE..=MAX_GENERATED_AGE),
        nationality,
        hobbies,
    }
}

fn pick(rng: &mut StdRng, pool: &[&str]) -> String {
    pool.choose(rng).copied().unwrap_or_default().to_string()
}

// ---------------------------------------------------------------------------
// UserDirectory
// ---------------------------------------------------------------------------

/// Read-only in-memory directory answering filtered, paginated queries.
#[derive(Debug, Clone, Default)]
pub struct UserDirectory {
    users: Vec<User>,
}

impl UserDirectory {
    pub fn new(users: Vec<User>) -> Self {
        Self { users }
    }

    /// A directory of `count` generated members.
    pub fn generated(count: usize, seed: u64) -> Self {
        Self::new(generate_users(count, seed))
    }

    pub fn len(&self) -> usize {
        self.users.len()
    }

    pub fn is_empty(&self) -> bool {
        self.users.is_empty()
    }

    /// Look a member up by id.
    pub fn get(&self, id: &str) -> Option<&User> {
        self.users.iter().find(|u| u.id == id)
    }

    /// Filter in insertion order, then slice page `page` (1-based).
    ///
    /// The caller is responsible for validating `criteria` first.
    pub fn query(&self, criteria: &FilterCriteria, page: u32) -> ResultPage<User> {
        let matching: Vec<User> = self
            .users
            .iter()
            .filter(|u| criteria.matches(u))
            .cloned()
            .collect();
        paginate(&matching, page, criteria.page_size)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
