use log::debug;
use rand::rngs::StdRng;
use rand::{RngExt, SeedableRng};

use crate::photo_types::PhotoRecord;

/// Rolls at or below this value put three photos on the page, above it two.
const TRIPLE_MAX_ROLL: u8 = 7;
const ROLL_SIDES: u8 = 10;

/// Visual template of a page, picked by how many photos it holds
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Arrangement {
    Single,
    Pair,
    Triple,
}

impl Arrangement {
    pub fn for_count(count: usize) -> Option<Self> {
        match count {
            1 => Some(Arrangement::Single),
            2 => Some(Arrangement::Pair),
            3 => Some(Arrangement::Triple),
            _ => None,
        }
    }

    pub fn photo_count(self) -> usize {
        match self {
            Arrangement::Single => 1,
            Arrangement::Pair => 2,
            Arrangement::Triple => 3,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Arrangement::Single => "single",
            Arrangement::Pair => "pair",
            Arrangement::Triple => "triple",
        }
    }
}

/// Photos that share one album page
#[derive(Debug, Clone, Copy)]
pub struct PageGroup<'a> {
    pub arrangement: Arrangement,
    pub photos: &'a [PhotoRecord],
}

/// Ordered pages of an album. Concatenating the groups yields the input.
#[derive(Debug, Clone, Default)]
pub struct AlbumPlan<'a> {
    pub groups: Vec<PageGroup<'a>>,
}

impl<'a> AlbumPlan<'a> {
    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    pub fn page_count(&self) -> usize {
        self.groups.len()
    }

    pub fn photo_count(&self) -> usize {
        self.groups.iter().map(|g| g.photos.len()).sum()
    }

    pub fn group_sizes(&self) -> Vec<usize> {
        self.groups.iter().map(|g| g.photos.len()).collect()
    }
}

/// Source of the 1..=10 rolls behind the page size decision.
pub trait PageSizeRoll {
    fn roll(&mut self) -> u8;
}

/// Uniform rolls from a generator owned by a single planner
#[derive(Debug)]
pub struct SeededRoll {
    rng: StdRng,
}

impl SeededRoll {
    /// Fresh generator seeded from the thread-local entropy source
    pub fn new() -> Self {
        Self {
            rng: StdRng::from_rng(&mut rand::rng()),
        }
    }

    pub fn with_seed(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }
}

impl Default for SeededRoll {
    fn default() -> Self {
        Self::new()
    }
}

impl PageSizeRoll for SeededRoll {
    fn roll(&mut self) -> u8 {
        self.rng.random_range(1..=ROLL_SIDES)
    }
}

/// Greedy left-to-right split of photos into pages of one to three.
pub struct PageLayoutPlanner<R: PageSizeRoll = SeededRoll> {
    roll: R,
}

impl PageLayoutPlanner<SeededRoll> {
    pub fn seeded() -> Self {
        Self::new(SeededRoll::new())
    }
}

impl<R: PageSizeRoll> PageLayoutPlanner<R> {
    pub fn new(roll: R) -> Self {
        Self { roll }
    }

    pub fn plan<'a>(&mut self, photos: &'a [PhotoRecord]) -> AlbumPlan<'a> {
        let mut groups = Vec::new();
        let mut rest = photos;

        while !rest.is_empty() {
            let arrangement = self.next_arrangement(rest.len());
            let (page, tail) = rest.split_at(arrangement.photo_count());

            debug!(
                "Page {}: {} photo(s), {} left after",
                groups.len() + 1,
                page.len(),
                tail.len()
            );
            groups.push(PageGroup {
                arrangement,
                photos: page,
            });
            rest = tail;
        }

        AlbumPlan { groups }
    }

    /// Arrangement for the next page given how many photos are still unplaced.
    /// Never holds more photos than `remaining`.
    fn next_arrangement(&mut self, remaining: usize) -> Arrangement {
        match remaining {
            1 => Arrangement::Single,
            2 => Arrangement::Pair,
            _ => {
                let roll = self.roll.roll();
                // the remaining >= 3 check is the oversize clamp, never false here
                let arrangement = if roll <= TRIPLE_MAX_ROLL && remaining >= 3 {
                    Arrangement::Triple
                } else {
                    Arrangement::Pair
                };
                debug!(
                    "Remaining: {}, roll: {}, chosen: {}",
                    remaining,
                    roll,
                    arrangement.photo_count()
                );
                arrangement
            }
        }
    }
}
