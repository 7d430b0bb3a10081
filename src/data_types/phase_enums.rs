/// Simple enum to restrict thing to hap1 or hap2
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd, strum_macros::AsRefStr, strum_macros::EnumIter)]
pub enum Haplotype {
    #[strum(serialize = "HAP1")]
    Hap1,
    #[strum(serialize = "HAP2")]
    Hap2
}

impl Haplotype {
    /// Converts into a 0-based index, useful for array lookups
    pub fn index(&self) -> usize {
        match self {
            Haplotype::Hap1 => 0,
            Haplotype::Hap2 => 1
        }
    }

    /// Returns the sibling haplotype
    pub fn other(&self) -> Haplotype {
        match self {
            Haplotype::Hap1 => Haplotype::Hap2,
            Haplotype::Hap2 => Haplotype::Hap1
        }
    }
}

/// The verdict on which call haplotype corresponds to which truth haplotype
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd, strum_macros::AsRefStr, strum_macros::EnumIter)]
pub enum PhaseDecision {
    /// Call hap1 pairs with truth hap1, call hap2 with truth hap2
    #[strum(serialize = "ORIG")]
    Original,
    /// Call hap1 pairs with truth hap2, call hap2 with truth hap1
    #[strum(serialize = "SWAP")]
    Swapped,
    /// Both pairings have the same distance
    #[strum(serialize = "NONE")]
    Unresolved
}

impl PhaseDecision {
    /// Picks the decision from the two candidate totals, ties are unresolved
    /// # Arguments
    /// * `orig_distance` - total distance of the original pairing
    /// * `swap_distance` - total distance of the swapped pairing
    pub fn from_distances(orig_distance: usize, swap_distance: usize) -> PhaseDecision {
        match orig_distance.cmp(&swap_distance) {
            std::cmp::Ordering::Less => PhaseDecision::Original,
            std::cmp::Ordering::Greater => PhaseDecision::Swapped,
            std::cmp::Ordering::Equal => PhaseDecision::Unresolved
        }
    }

    /// Returns the decision we would get if the truth haplotype labels were exchanged
    pub fn flipped(&self) -> PhaseDecision {
        match self {
            PhaseDecision::Original => PhaseDecision::Swapped,
            PhaseDecision::Swapped => PhaseDecision::Original,
            PhaseDecision::Unresolved => PhaseDecision::Unresolved
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use strum::IntoEnumIterator;

    #[test]
    fn test_haplotype() {
        assert_eq!(Haplotype::Hap1.index(), 0);
        assert_eq!(Haplotype::Hap2.index(), 1);
        assert_eq!(Haplotype::Hap1.other(), Haplotype::Hap2);
        assert_eq!(Haplotype::Hap2.as_ref(), "HAP2");
        assert_eq!(Haplotype::iter().collect::<Vec<Haplotype>>(), vec![Haplotype::Hap1, Haplotype::Hap2]);
    }

    #[test]
    fn test_phase_decision() {
        assert_eq!(PhaseDecision::from_distances(1, 3), PhaseDecision::Original);
        assert_eq!(PhaseDecision::from_distances(3, 1), PhaseDecision::Swapped);
        assert_eq!(PhaseDecision::from_distances(2, 2), PhaseDecision::Unresolved);
        assert_eq!(PhaseDecision::Original.flipped(), PhaseDecision::Swapped);
        assert_eq!(PhaseDecision::Unresolved.flipped(), PhaseDecision::Unresolved);
        assert_eq!(PhaseDecision::Unresolved.as_ref(), "NONE");
        let decisions: Vec<PhaseDecision> = PhaseDecision::iter().collect();
        let labels: Vec<&str> = decisions.iter().map(|d| d.as_ref()).collect();
        assert_eq!(labels, vec!["ORIG", "SWAP", "NONE"]);
    }
}
