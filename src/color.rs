//! Six-coloring of planar graphs.
//!
//! Used to render adjacent puzzle cages in distinct colors; the graph fed in
//! is the cage-adjacency graph, which is planar by construction.

use crate::error::Error;

/// Colors the vertices of a planar graph with at most six colors so that
/// adjacent vertices differ.
///
/// `adjacency[v]` lists the neighbors of vertex `v`; lists must be symmetric,
/// without self-loops or duplicates. Returns one color in `0..=5` per vertex.
///
/// Every planar graph has a vertex of degree five or less (Euler's formula),
/// so vertices can be eliminated one at a time and colored in reverse order
/// with the least color absent from their already-colored neighbors. The
/// elimination order is explicit rather than recursive, so graphs of any
/// size stay within stack bounds. Fails with [`Error::MustBePlanar`] when no
/// low-degree vertex exists, which only a non-planar input can cause.
pub fn six_color(adjacency: &[Vec<usize>]) -> Result<Vec<u8>, Error> {
    let n = adjacency.len();
    let mut degree: Vec<usize> = adjacency.iter().map(Vec::len).collect();
    let mut removed = vec![false; n];
    let mut order = Vec::with_capacity(n);

    for _ in 0..n {
        let v = (0..n)
            .find(|&v| !removed[v] && degree[v] <= 5)
            .ok_or(Error::MustBePlanar)?;
        removed[v] = true;
        order.push(v);
        for &w in &adjacency[v] {
            if !removed[w] {
                degree[w] -= 1;
            }
        }
    }

    const UNSET: u8 = u8::MAX;
    let mut colors = vec![UNSET; n];
    for &v in order.iter().rev() {
        let mut used = [false; 6];
        for &w in &adjacency[v] {
            if colors[w] != UNSET {
                used[colors[w] as usize] = true;
            }
        }
        // at most five neighbors were colored after v, so one color is free
        colors[v] = (0..6)
            .find(|&c| !used[c as usize])
            .expect("a vertex eliminated at degree five or less has a free color");
    }

    Ok(colors)
}
