/// This module implements a variant of
/// [pathfinding's astar function](https://docs.rs/pathfinding/latest/pathfinding/directed/astar/index.html)
/// that keeps its buffers in a reusable [SearchContext], finalizes nodes in a closed set and
/// breaks ties between equal estimates by insertion order.
use fxhash::FxBuildHasher;
use indexmap::map::Entry::{Occupied, Vacant};
use indexmap::IndexMap;
use num_traits::Zero;
use std::cmp::Ordering;
use std::collections::BinaryHeap;
use std::hash::Hash;
use std::ops::Add;

pub type FxIndexMap<K, V> = IndexMap<K, V, FxBuildHasher>;

struct SmallestCostHolder<C> {
    estimated_cost: C,
    cost: C,
    index: usize,
    sequence: usize,
}

impl<C: PartialOrd> Eq for SmallestCostHolder<C> {}

impl<C: PartialOrd> PartialEq for SmallestCostHolder<C> {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl<C: PartialOrd> PartialOrd for SmallestCostHolder<C> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl<C: PartialOrd> Ord for SmallestCostHolder<C> {
    fn cmp(&self, other: &Self) -> Ordering {
        // Lowest estimate first, then first inserted first
        match other.estimated_cost.partial_cmp(&self.estimated_cost) {
            Some(Ordering::Equal) | None => other.sequence.cmp(&self.sequence),
            Some(s) => s,
        }
    }
}

/// Bookkeeping for a single visited node, valid only for the search that created it.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SearchNode<C> {
    /// Index of the parent in [SearchContext::nodes], `usize::MAX` for the start.
    pub parent: usize,
    pub g: C,
    pub h: C,
    pub closed: bool,
}

impl<C: Add<Output = C> + Copy> SearchNode<C> {
    pub fn f(&self) -> C {
        self.g + self.h
    }
}

/// Open heap and node table of an A* search. Both are cleared at the start of every search so
/// no state leaks between unrelated requests; only the allocations are reused.
pub struct SearchContext<N, C> {
    to_see: BinaryHeap<SmallestCostHolder<C>>,
    pub nodes: FxIndexMap<N, SearchNode<C>>,
    sequence: usize,
}

impl<N, C> Default for SearchContext<N, C>
where
    N: Eq + Hash + Clone,
    C: PartialOrd,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<N, C> SearchContext<N, C>
where
    N: Eq + Hash + Clone,
    C: PartialOrd,
{
    pub fn new() -> Self {
        SearchContext {
            to_see: BinaryHeap::new(),
            nodes: FxIndexMap::default(),
            sequence: 0,
        }
    }

    fn reset(&mut self) {
        self.to_see.clear();
        self.nodes.clear();
        self.sequence = 0;
    }

    fn push(&mut self, estimated_cost: C, cost: C, index: usize) {
        self.to_see.push(SmallestCostHolder {
            estimated_cost,
            cost,
            index,
            sequence: self.sequence,
        });
        self.sequence += 1;
    }

    fn reverse_path(&self, start: usize) -> Vec<N> {
        let mut i = start;
        let mut path: Vec<N> = std::iter::from_fn(|| {
            self.nodes.get_index(i).map(|(node, value)| {
                i = value.parent;
                node.clone()
            })
        })
        .collect();
        path.reverse();
        path
    }

    /// Runs A* from `start` until `success` holds for an extracted node. Returns the path
    /// including `start` and its cost, or [None] once the open set runs dry.
    pub fn astar<FN, IN, FH, FS>(
        &mut self,
        start: &N,
        mut successors: FN,
        mut heuristic: FH,
        mut success: FS,
    ) -> Option<(Vec<N>, C)>
    where
        C: Zero + Copy,
        FN: FnMut(&N) -> IN,
        IN: IntoIterator<Item = (N, C)>,
        FH: FnMut(&N) -> C,
        FS: FnMut(&N) -> bool,
    {
        self.reset();
        let h = heuristic(start);
        self.nodes.insert(
            start.clone(),
            SearchNode {
                parent: usize::MAX,
                g: Zero::zero(),
                h,
                closed: false,
            },
        );
        self.push(h, Zero::zero(), 0);
        while let Some(SmallestCostHolder { cost, index, .. }) = self.to_see.pop() {
            let successors = {
                let (node, record) = match self.nodes.get_index_mut(index) {
                    Some(entry) => entry,
                    None => continue,
                };
                // A node may sit in the heap several times if a cheaper route was found after
                // it was first queued; only its first extraction counts.
                if record.closed {
                    continue;
                }
                if success(node) {
                    let path = self.reverse_path(index);
                    return Some((path, cost));
                }
                record.closed = true;
                successors(node)
            };
            for (successor, move_cost) in successors {
                let new_cost = cost + move_cost;
                let (n, estimate) = match self.nodes.entry(successor) {
                    Vacant(e) => {
                        let h = heuristic(e.key());
                        let n = e.index();
                        e.insert(SearchNode {
                            parent: index,
                            g: new_cost,
                            h,
                            closed: false,
                        });
                        (n, new_cost + h)
                    }
                    Occupied(mut e) => {
                        let record = e.get_mut();
                        if record.closed || !(new_cost < record.g) {
                            continue;
                        }
                        record.g = new_cost;
                        record.parent = index;
                        let estimate = record.f();
                        (e.index(), estimate)
                    }
                };
                self.push(estimate, new_cost, n);
            }
        }
        None
    }
}
