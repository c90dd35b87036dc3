use crate::error::{Error, Result};
use crate::Float;
use itertools::Itertools;
use std::ops::Range;
use tracing::trace;

/// Relative tolerance used when deciding whether node spacing is constant.
pub const LINEAR_RTOL: Float = 1e-7;

// A linear grid is a sub-range of the parent linspace lo..=hi with `steps`
// intervals. Node m sits at parent index first + stride * m. Keeping the
// integer indices around means cropping and halving never accumulate
// rounding error, and the parent endpoints are hit exactly.
#[derive(Debug, Clone, PartialEq)]
struct LinearGrid {
    lo: Float,
    hi: Float,
    steps: usize,
    first: usize,
    stride: usize,
    cells: usize,
}

impl LinearGrid {
    #[inline(always)]
    fn node(&self, m: usize) -> Float {
        let j = self.first + self.stride * m;
        lerp(self.lo, self.hi, j as Float / self.steps as Float)
    }

    #[inline(always)]
    fn center(&self, m: usize) -> Float {
        let j2 = 2 * self.first + self.stride * (2 * m + 1);
        lerp(self.lo, self.hi, j2 as Float / (2 * self.steps) as Float)
    }

    fn spacing(&self) -> Float {
        (self.hi - self.lo) * self.stride as Float / self.steps as Float
    }
}

#[derive(Debug, Clone, PartialEq)]
enum Grid {
    Empty,
    Nodes(Vec<Float>),
    Linear(LinearGrid),
}

impl Default for Grid {
    fn default() -> Self {
        Grid::Empty
    }
}

#[inline(always)]
fn lerp(a: Float, b: Float, t: Float) -> Float {
    a * (1.0 - t) + b * t
}

fn is_strictly_monotonic(nodes: &[Float]) -> bool {
    nodes.iter().tuple_windows().all(|(a, b)| a < b)
        || nodes.iter().tuple_windows().all(|(a, b)| a > b)
}

fn nodes_are_linear(nodes: &[Float]) -> bool {
    if nodes.len() < 2 {
        return false;
    }
    let mean = (nodes[nodes.len() - 1] - nodes[0]) / (nodes.len() - 1) as Float;
    mean != 0.0
        && nodes
            .iter()
            .tuple_windows()
            .all(|(a, b)| ((b - a) - mean).abs() <= LINEAR_RTOL * mean.abs())
}

/// One coordinate dimension of a field.
///
/// An axis with `n` cells has `n + 1` nodes (cell boundaries). The nodes are
/// the stored representation; cell centers, extent and length are derived
/// from them on every call.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Axis {
    pub name: String,
    pub unit: String,
    grid: Grid,
}

impl Axis {
    pub fn new(name: impl Into<String>, unit: impl Into<String>) -> Axis {
        Axis {
            name: name.into(),
            unit: unit.into(),
            grid: Grid::Empty,
        }
    }

    /// Builder form of [`Axis::set_extent`].
    pub fn with_extent(mut self, extent: [Float; 2], count: usize) -> Result<Axis> {
        self.set_extent(extent, count)?;
        Ok(self)
    }

    // Callers guarantee finite, distinct bounds whenever count > 0.
    pub(crate) fn regular(name: String, unit: String, lo: Float, hi: Float, count: usize) -> Axis {
        let grid = if count == 0 {
            Grid::Nodes(vec![lo])
        } else {
            Grid::Linear(LinearGrid {
                lo,
                hi,
                steps: count,
                first: 0,
                stride: 1,
                cells: count,
            })
        };
        Axis { name, unit, grid }
    }

    /// Replaces the grid with `count` equal cells spanning `extent`.
    pub fn set_extent(&mut self, extent: [Float; 2], count: usize) -> Result<()> {
        let [low, high] = extent;
        if !low.is_finite() || !high.is_finite() || (count > 0 && low == high) {
            return Err(Error::InvalidExtent { low, high });
        }
        let name = std::mem::take(&mut self.name);
        let unit = std::mem::take(&mut self.unit);
        *self = Axis::regular(name, unit, low, high, count);
        Ok(())
    }

    /// Number of cells.
    pub fn len(&self) -> usize {
        match &self.grid {
            Grid::Empty => 0,
            Grid::Nodes(nodes) => nodes.len().saturating_sub(1),
            Grid::Linear(lin) => lin.cells,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Cell boundaries, one more than there are cells.
    pub fn grid_node(&self) -> Vec<Float> {
        match &self.grid {
            Grid::Empty => Vec::new(),
            Grid::Nodes(nodes) => nodes.clone(),
            Grid::Linear(lin) => (0..=lin.cells).map(|m| lin.node(m)).collect(),
        }
    }

    /// Stores `nodes` as the new cell boundaries.
    pub fn set_grid_node(&mut self, nodes: Vec<Float>) -> Result<()> {
        if !is_strictly_monotonic(&nodes) {
            return Err(Error::NonMonotonic);
        }
        self.grid = Grid::Nodes(nodes);
        Ok(())
    }

    /// Cell centers.
    pub fn grid(&self) -> Vec<Float> {
        match &self.grid {
            Grid::Empty => Vec::new(),
            Grid::Nodes(nodes) => nodes
                .iter()
                .tuple_windows()
                .map(|(a, b)| (a + b) / 2.0)
                .collect(),
            Grid::Linear(lin) => (0..lin.cells).map(|m| lin.center(m)).collect(),
        }
    }

    /// Sets the cell centers. Interior nodes become the midpoints between
    /// neighbouring centers and the outer nodes extend half a spacing beyond
    /// the first and last center, so a regularly spaced input is reproduced
    /// exactly by [`Axis::grid`].
    pub fn set_grid(&mut self, centers: &[Float]) -> Result<()> {
        let n = centers.len();
        if n < 2 {
            return Err(Error::TooFewCells { needed: 2, found: n });
        }
        let mut nodes = Vec::with_capacity(n + 1);
        nodes.push(centers[0] - (centers[1] - centers[0]) / 2.0);
        nodes.extend(centers.iter().tuple_windows().map(|(a, b)| (a + b) / 2.0));
        nodes.push(centers[n - 1] + (centers[n - 1] - centers[n - 2]) / 2.0);
        self.set_grid_node(nodes)
    }

    /// First and last node, `None` while the axis has fewer than two nodes.
    pub fn extent(&self) -> Option<[Float; 2]> {
        match &self.grid {
            Grid::Nodes(nodes) if nodes.len() >= 2 => Some([nodes[0], nodes[nodes.len() - 1]]),
            Grid::Linear(lin) => Some([lin.node(0), lin.node(lin.cells)]),
            _ => None,
        }
    }

    /// Whether the nodes are equally spaced. Axes built by `set_extent` are
    /// known to be linear and are only inspected when `force` is set.
    pub fn is_linear(&self, force: bool) -> bool {
        match &self.grid {
            Grid::Linear(_) if !force => true,
            Grid::Nodes(nodes) => nodes_are_linear(nodes),
            _ => nodes_are_linear(&self.grid_node()),
        }
    }

    /// Signed width of one cell.
    pub fn spacing(&self) -> Result<Float> {
        match &self.grid {
            Grid::Linear(lin) => Ok(lin.spacing()),
            Grid::Nodes(nodes) if nodes.len() >= 2 => {
                if nodes_are_linear(nodes) {
                    Ok((nodes[nodes.len() - 1] - nodes[0]) / (nodes.len() - 1) as Float)
                } else {
                    Err(Error::IrregularGrid)
                }
            }
            _ => Err(Error::NoExtent),
        }
    }

    /// Snaps both bounds of `extent` (in either order) to their nearest
    /// nodes, keeps the nodes between them and returns the range of retained
    /// cells, indexed as before the cut. Nodes are never interpolated. Fails,
    /// leaving the axis untouched, if the extent misses the axis or both
    /// bounds snap to the same node.
    pub fn cutout(&mut self, extent: [Float; 2]) -> Result<Range<usize>> {
        let (low, high) = if extent[0] <= extent[1] {
            (extent[0], extent[1])
        } else {
            (extent[1], extent[0])
        };
        let out_of_range = Err(Error::CutoutOutOfRange { low, high });
        let nodes = self.grid_node();
        let (first, last) = match self.extent() {
            Some([a, b]) => (a.min(b), a.max(b)),
            None => return out_of_range,
        };
        if !(low <= last && high >= first) {
            return out_of_range;
        }
        let nearest = |x: Float| {
            nodes
                .iter()
                .position_min_by(|a, b| (*a - x).abs().total_cmp(&(*b - x).abs()))
                .unwrap_or(0)
        };
        let (i, j) = (nearest(low), nearest(high));
        let (start, end) = (i.min(j), i.max(j));
        if start == end {
            return out_of_range;
        }

        let grid = match &self.grid {
            Grid::Linear(lin) => Grid::Linear(LinearGrid {
                first: lin.first + lin.stride * start,
                cells: end - start,
                ..lin.clone()
            }),
            _ => Grid::Nodes(nodes[start..=end].to_vec()),
        };
        self.grid = grid;
        trace!(low, high, start, end, "axis cut out");
        Ok(start..end)
    }

    /// Keeps every second node. An odd cell count loses its last cell.
    pub fn half_resolution(&mut self) -> Result<()> {
        let cells = self.len();
        if cells < 2 {
            return Err(Error::TooFewCells {
                needed: 2,
                found: cells,
            });
        }
        let grid = match &self.grid {
            Grid::Linear(lin) => Grid::Linear(LinearGrid {
                stride: 2 * lin.stride,
                cells: cells / 2,
                ..lin.clone()
            }),
            _ => Grid::Nodes(
                self.grid_node()
                    .into_iter()
                    .step_by(2)
                    .take(cells / 2 + 1)
                    .collect(),
            ),
        };
        self.grid = grid;
        trace!(from = cells, to = cells / 2, "axis resolution halved");
        Ok(())
    }
}

#[cfg(test)]
pub mod tests {
    use super::*;

    #[test]
    fn linear_nodes_hit_endpoints() {
        let ax = Axis::new("x", "m").with_extent([3.3, 5.5], 7).unwrap();
        let nodes = ax.grid_node();
        assert_eq!(nodes[0], 3.3);
        assert_eq!(nodes[7], 5.5);
        assert_eq!(ax.extent(), Some([3.3, 5.5]));
    }

    #[test]
    fn halving_twice_matches_stride_four() {
        let mut ax = Axis::new("", "").with_extent([0.0, 1.0], 16).unwrap();
        ax.half_resolution().unwrap();
        ax.half_resolution().unwrap();
        assert_eq!(ax.grid_node(), vec![0.0, 0.25, 0.5, 0.75, 1.0]);
        assert_eq!(ax.grid(), vec![0.125, 0.375, 0.625, 0.875]);
    }

    #[test]
    fn irregular_nodes_are_not_linear() {
        let mut ax = Axis::default();
        ax.set_grid_node(vec![0.0, 1.0, 3.0, 6.0]).unwrap();
        assert!(!ax.is_linear(false));
        assert!(!ax.is_linear(true));
        assert_eq!(ax.spacing(), Err(Error::IrregularGrid));
    }

    #[test]
    fn decreasing_nodes_are_accepted() {
        let mut ax = Axis::default();
        ax.set_grid_node(vec![3.0, 2.0, 1.0]).unwrap();
        assert!(ax.is_linear(false));
        assert_eq!(ax.spacing(), Ok(-1.0));
        assert_eq!(ax.set_grid_node(vec![1.0, 2.0, 2.0]), Err(Error::NonMonotonic));
        // rejected input leaves the old nodes in place
        assert_eq!(ax.grid_node(), vec![3.0, 2.0, 1.0]);
    }
}
