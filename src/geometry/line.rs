//! Integer line rasterization (Bresenham)

use glam::IVec2;

/// All grid points on the straight path from `a` to `b`, both inclusive
///
/// The pixel set is the same whichever way round the endpoints are given:
/// points are always traced from the left-most (then top-most) end and the
/// result is reversed when that is not `a`, so the path starts at `a`.
/// No floating point is involved.
pub fn points_between(a: IVec2, b: IVec2) -> Vec<IVec2> {
    let reversed = (b.x, b.y) < (a.x, a.y);
    let (mut p, q) = if reversed { (b, a) } else { (a, b) };

    let dx = q.x - p.x;
    let dy = (q.y - p.y).abs();
    let sy = (q.y - p.y).signum();

    let mut pts = Vec::with_capacity((dx.max(dy) + 1) as usize);

    if dx >= dy {
        // wider than high (covers horizontal, diagonal and single points)
        let mut e = dx;
        for _ in 0..dx {
            pts.push(p);
            p.x += 1;
            e -= 2 * dy;
            if e < 0 {
                p.y += sy;
                e += 2 * dx;
            }
        }
    } else {
        // higher than wide
        let mut e = dy;
        for _ in 0..dy {
            pts.push(p);
            p.y += sy;
            e -= 2 * dx;
            if e < 0 {
                p.x += 1;
                e += 2 * dy;
            }
        }
    }
    pts.push(q);

    if reversed {
        pts.reverse();
    }
    pts
}
