use serde::{Deserialize, Serialize};

/// Which side a position sticks to when content is inserted exactly at it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Assoc {
    Before,
    #[default]
    After,
}

impl Assoc {
    fn is_before(self) -> bool {
        self == Assoc::Before
    }
}

const DEL_BEFORE: u8 = 1;
const DEL_AFTER: u8 = 2;
const DEL_ACROSS: u8 = 4;
const DEL_SIDE: u8 = 8;

/// A mapped position plus what happened to the content around it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MapResult {
    pub pos: usize,
    del_info: u8,
}

impl MapResult {
    /// The position was deleted on the side it is associated with.
    pub fn deleted(&self) -> bool {
        self.del_info & DEL_SIDE > 0
    }

    pub fn deleted_before(&self) -> bool {
        self.del_info & (DEL_BEFORE | DEL_ACROSS) > 0
    }

    pub fn deleted_after(&self) -> bool {
        self.del_info & (DEL_AFTER | DEL_ACROSS) > 0
    }

    pub fn deleted_across(&self) -> bool {
        self.del_info & DEL_ACROSS > 0
    }
}

/// The position changes made by one step: a sorted list of replaced
/// ranges, each `[start, old_size, new_size]`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StepMap {
    ranges: Vec<[usize; 3]>,
    inverted: bool,
}

impl StepMap {
    pub fn new(ranges: Vec<[usize; 3]>) -> Self {
        Self {
            ranges: ranges.into_iter().filter(|r| r[1] != 0 || r[2] != 0).collect(),
            inverted: false,
        }
    }

    pub fn empty() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.ranges.is_empty()
    }

    pub fn map(&self, pos: usize, assoc: Assoc) -> usize {
        self.map_result(pos, assoc).pos
    }

    pub fn map_result(&self, pos: usize, assoc: Assoc) -> MapResult {
        let mut diff: isize = 0;
        for range in &self.ranges {
            let start = if self.inverted {
                shift(range[0], -diff)
            } else {
                range[0]
            };
            if start > pos {
                break;
            }
            let (old_size, new_size) = if self.inverted {
                (range[2], range[1])
            } else {
                (range[1], range[2])
            };
            let end = start + old_size;
            if pos <= end {
                let before = if old_size == 0 {
                    assoc.is_before()
                } else if pos == start {
                    true
                } else if pos == end {
                    false
                } else {
                    assoc.is_before()
                };
                let result = shift(start, diff) + if before { 0 } else { new_size };
                let mut del_info = if pos == start {
                    DEL_AFTER
                } else if pos == end {
                    DEL_BEFORE
                } else {
                    DEL_ACROSS
                };
                let on_side = if assoc.is_before() { pos != start } else { pos != end };
                if on_side {
                    del_info |= DEL_SIDE;
                }
                return MapResult {
                    pos: result,
                    del_info,
                };
            }
            diff += new_size as isize - old_size as isize;
        }
        MapResult {
            pos: shift(pos, diff),
            del_info: 0,
        }
    }

    /// Calls `f(old_start, old_end, new_start, new_end)` for each changed range.
    pub fn for_each(&self, mut f: impl FnMut(usize, usize, usize, usize)) {
        let mut diff: isize = 0;
        for range in &self.ranges {
            let start = range[0];
            let old_start = if self.inverted { shift(start, -diff) } else { start };
            let new_start = if self.inverted { start } else { shift(start, diff) };
            let (old_size, new_size) = if self.inverted {
                (range[2], range[1])
            } else {
                (range[1], range[2])
            };
            f(old_start, old_start + old_size, new_start, new_start + new_size);
            diff += new_size as isize - old_size as isize;
        }
    }

    pub fn invert(&self) -> StepMap {
        StepMap {
            ranges: self.ranges.clone(),
            inverted: !self.inverted,
        }
    }
}

fn shift(pos: usize, diff: isize) -> usize {
    pos.saturating_add_signed(diff)
}

/// A sequence of step maps, applied left to right.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Mapping {
    maps: Vec<StepMap>,
}

impl Mapping {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn maps(&self) -> &[StepMap] {
        &self.maps
    }

    pub fn len(&self) -> usize {
        self.maps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.maps.is_empty()
    }

    pub fn append_map(&mut self, map: StepMap) {
        self.maps.push(map);
    }

    /// The mapping made of the maps from index `from` onwards.
    pub fn slice(&self, from: usize) -> Mapping {
        Mapping {
            maps: self.maps.get(from..).map(<[StepMap]>::to_vec).unwrap_or_default(),
        }
    }

    pub fn map(&self, pos: usize, assoc: Assoc) -> usize {
        let mapped = self.maps.iter().fold(pos, |pos, map| map.map(pos, assoc));
        log::trace!("mapped {pos} -> {mapped}");
        mapped
    }

    pub fn map_result(&self, pos: usize, assoc: Assoc) -> MapResult {
        let mut del_info = 0;
        let mut pos = pos;
        for map in &self.maps {
            let result = map.map_result(pos, assoc);
            del_info |= result.del_info;
            pos = result.pos;
        }
        MapResult { pos, del_info }
    }

    /// The mapping that undoes this one.
    pub fn invert(&self) -> Mapping {
        Mapping {
            maps: self.maps.iter().rev().map(StepMap::invert).collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(0, Assoc::After, 0)]
    #[case(2, Assoc::After, 2)]
    #[case(3, Assoc::Before, 3)]
    #[case(3, Assoc::After, 5)]
    #[case(4, Assoc::After, 6)]
    fn insertion_shifts_following_positions(#[case] pos: usize, #[case] assoc: Assoc, #[case] expected: usize) {
        let map = StepMap::new(vec![[3, 0, 2]]);
        assert_eq!(map.map(pos, assoc), expected);
    }

    #[test]
    fn deletion_collapses_range() {
        let map = StepMap::new(vec![[2, 4, 0]]);
        assert_eq!(map.map(1, Assoc::After), 1);
        assert_eq!(map.map(4, Assoc::After), 2);
        assert_eq!(map.map(8, Assoc::After), 4);
        let inside = map.map_result(4, Assoc::After);
        assert!(inside.deleted());
        assert!(inside.deleted_across());
        let edge = map.map_result(2, Assoc::Before);
        assert!(!edge.deleted());
        assert!(edge.deleted_after());
    }

    #[test]
    fn inverted_map_restores_positions() {
        let map = StepMap::new(vec![[3, 0, 2], [10, 4, 1]]);
        let inverted = map.invert();
        for pos in [0, 1, 3, 9, 20] {
            assert_eq!(inverted.map(map.map(pos, Assoc::Before), Assoc::Before), pos);
        }
    }

    #[test]
    fn mapping_composes_and_slices() {
        let mut mapping = Mapping::new();
        mapping.append_map(StepMap::new(vec![[0, 0, 5]]));
        mapping.append_map(StepMap::new(vec![[0, 0, 1]]));
        assert_eq!(mapping.map(2, Assoc::After), 8);
        assert_eq!(mapping.slice(1).map(2, Assoc::After), 3);
        assert_eq!(mapping.slice(2).map(2, Assoc::After), 2);
        assert_eq!(mapping.invert().map(8, Assoc::After), 2);
    }

    #[test]
    fn identity_mapping_is_stable() {
        let mapping = Mapping::new();
        assert_eq!(mapping.map(42, Assoc::Before), 42);
        assert!(!mapping.map_result(42, Assoc::After).deleted());
    }

    #[test]
    fn for_each_reports_new_ranges() {
        let map = StepMap::new(vec![[1, 2, 0], [5, 0, 3]]);
        let mut seen = Vec::new();
        map.for_each(|a, b, c, d| seen.push((a, b, c, d)));
        assert_eq!(seen, vec![(1, 3, 1, 1), (5, 5, 3, 6)]);
    }
}
