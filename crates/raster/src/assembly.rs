//! Primitive assembly: turn index buffers into triangles.

use softraster_common::Topology;

/// Walk `indices` as a triangle strip.
///
/// Emits the overlapping triples `(i, i+1, i+2)`. Every second triple swaps
/// its first two indices so all triangles keep the strip's winding:
/// `[0, 1, 2, 3]` yields `(0, 1, 2)` then `(2, 1, 3)`. `vertex` fetches the
/// vertex for an index; `render` receives the indices it came from and the
/// three vertices. Returns the number of triangles emitted.
pub fn draw_strip<V, G, R>(indices: &[u32], mut vertex: G, mut render: R) -> usize
where
    G: FnMut(u32) -> V,
    R: FnMut([u32; 3], [V; 3]),
{
    let mut emitted = 0;
    for (i, window) in indices.windows(3).enumerate() {
        let triple = if i % 2 == 0 {
            [window[0], window[1], window[2]]
        } else {
            [window[1], window[0], window[2]]
        };
        render(triple, triple.map(&mut vertex));
        emitted += 1;
    }
    emitted
}

/// Walk `indices` as an independent triangle list, each group of three
/// treated as its own one-triangle strip. A trailing partial group is ignored.
pub fn draw_list<V, G, R>(indices: &[u32], mut vertex: G, mut render: R) -> usize
where
    G: FnMut(u32) -> V,
    R: FnMut([u32; 3], [V; 3]),
{
    indices
        .chunks_exact(3)
        .map(|group| draw_strip(group, &mut vertex, &mut render))
        .sum()
}

/// Dispatch on the topology of an index buffer.
pub fn draw_indexed<V, G, R>(topology: Topology, indices: &[u32], vertex: G, render: R) -> usize
where
    G: FnMut(u32) -> V,
    R: FnMut([u32; 3], [V; 3]),
{
    match topology {
        Topology::TriangleList => draw_list(indices, vertex, render),
        Topology::TriangleStrip => draw_strip(indices, vertex, render),
    }
}
