//! Triangle strip rasterisation with a textured fill.
//!

use crate::{Filter, SamplerDesc, Size, Vertex};

use super::SoftwareTexture;

/// Fill the whole target with a colour.
pub fn clear(target: &mut SoftwareTexture, colour: [f32; 4]) {
    target.fill(colour.map(to_unorm));
}

/// Draw a four vertex triangle strip into the viewport at the target origin, sampling `texture`.
pub fn draw_strip(
    target: &mut SoftwareTexture,
    viewport: Size,
    vertices: &[Vertex; 4],
    texture: &SoftwareTexture,
    sampler: SamplerDesc,
) {
    let target_size = target.size();
    let width = viewport.width.min(target_size.width);
    let height = viewport.height.min(target_size.height);
    if width == 0 || height == 0 || texture.size().is_empty() {
        return;
    }

    let to_screen = |vertex: &Vertex| ScreenVertex {
        x: (vertex.position[0] + 1.0) * 0.5 * viewport.width as f32,
        y: (1.0 - vertex.position[1]) * 0.5 * viewport.height as f32,
        uv: vertex.uv,
    };
    let screen = vertices.each_ref().map(to_screen);

    // Pixels on the shared edge are only shaded by the first triangle.
    let mut covered = vec![false; width as usize * height as usize];

    for [a, b, c] in [[0, 1, 2], [1, 2, 3]] {
        let triangle = [screen[a], screen[b], screen[c]];
        let area = edge(&triangle[0], &triangle[1], triangle[2].x, triangle[2].y);
        if area == 0.0 {
            continue;
        }

        let (min_x, max_x) = span(triangle.map(|v| v.x), width);
        let (min_y, max_y) = span(triangle.map(|v| v.y), height);

        for y in min_y..max_y {
            for x in min_x..max_x {
                let index = y as usize * width as usize + x as usize;
                if covered[index] {
                    continue;
                }

                let px = x as f32 + 0.5;
                let py = y as f32 + 0.5;

                let w0 = edge(&triangle[1], &triangle[2], px, py) / area;
                let w1 = edge(&triangle[2], &triangle[0], px, py) / area;
                let w2 = edge(&triangle[0], &triangle[1], px, py) / area;
                if w0 < 0.0 || w1 < 0.0 || w2 < 0.0 {
                    continue;
                }

                let u = w0 * triangle[0].uv[0] + w1 * triangle[1].uv[0] + w2 * triangle[2].uv[0];
                let v = w0 * triangle[0].uv[1] + w1 * triangle[1].uv[1] + w2 * triangle[2].uv[1];

                target.set(x, y, sample(texture, sampler, u, v));
                covered[index] = true;
            }
        }
    }
}

#[derive(Clone, Copy)]
struct ScreenVertex {
    x: f32,
    y: f32,
    uv: [f32; 2],
}

fn edge(a: &ScreenVertex, b: &ScreenVertex, x: f32, y: f32) -> f32 {
    (b.x - a.x) * (y - a.y) - (b.y - a.y) * (x - a.x)
}

/// The pixel range whose centres may fall within `coordinates`, clipped to `0..limit`.
fn span(coordinates: [f32; 3], limit: u32) -> (u32, u32) {
    let min = coordinates.iter().copied().fold(f32::INFINITY, f32::min);
    let max = coordinates.iter().copied().fold(f32::NEG_INFINITY, f32::max);

    let start = (min - 0.5).ceil().max(0.0) as u32;
    let end = ((max - 0.5).floor() + 1.0).clamp(0.0, limit as f32) as u32;

    (start.min(limit), end)
}

/// Sample the texture at normalised coordinates.
pub fn sample(texture: &SoftwareTexture, sampler: SamplerDesc, u: f32, v: f32) -> [u8; 4] {
    let size = texture.size();
    let tx = u * size.width as f32;
    let ty = v * size.height as f32;

    match sampler.filter {
        Filter::Linear => {
            let tx = tx - 0.5;
            let ty = ty - 0.5;
            let x0 = tx.floor();
            let y0 = ty.floor();
            let fx = tx - x0;
            let fy = ty - y0;
            let (x0, y0) = (x0 as i64, y0 as i64);

            let fetch = |x, y| texture.fetch(x, y, sampler.address_mode).map(f32::from);
            let top = lerp(fetch(x0, y0), fetch(x0 + 1, y0), fx);
            let bottom = lerp(fetch(x0, y0 + 1), fetch(x0 + 1, y0 + 1), fx);

            lerp(top, bottom, fy).map(|channel| channel.round().clamp(0.0, 255.0) as u8)
        }
    }
}

fn lerp(a: [f32; 4], b: [f32; 4], t: f32) -> [f32; 4] {
    core::array::from_fn(|channel| a[channel] + (b[channel] - a[channel]) * t)
}

fn to_unorm(channel: f32) -> u8 {
    (channel.clamp(0.0, 1.0) * 255.0).round() as u8
}
