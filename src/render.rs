use crate::types::{Placement, Rect};

const MAX_COLS: f64 = 80.0;
const MAX_ROWS: f64 = 40.0;

/// ASCII diagram of one sheet: the stock border plus every placement,
/// labelled with its pre-rotation dimensions. Columns run across the
/// sheet width, rows along its length.
pub fn render_sheet(stock: Rect, placements: &[Placement]) -> String {
    let scale = f64::min(MAX_COLS / stock.width as f64, MAX_ROWS / stock.length as f64);
    let grid_w = (stock.width as f64 * scale).round() as usize;
    let grid_h = (stock.length as f64 * scale).round() as usize;

    if grid_w == 0 || grid_h == 0 {
        return String::new();
    }

    let mut grid = vec![vec![' '; grid_w + 1]; grid_h + 1];

    // Stock border first, placements on top.
    draw_rect(&mut grid, 0, 0, grid_w, grid_h);

    for p in placements {
        let sx = (p.x as f64 * scale).round() as usize;
        let sy = (p.y as f64 * scale).round() as usize;
        let sw = (p.w as f64 * scale).round() as usize;
        let sh = (p.h as f64 * scale).round() as usize;

        if sw == 0 || sh == 0 {
            continue;
        }

        draw_rect(&mut grid, sx, sy, sw, sh);

        let label = format!("{}", p.original);
        let label_chars: Vec<char> = label.chars().collect();

        if sw > 2 && sh > 0 {
            let cx = sx + sw / 2;
            let cy = sy + sh / 2;
            let half = label_chars.len() / 2;
            let start_x = cx.saturating_sub(half);

            for (i, &ch) in label_chars.iter().enumerate() {
                let x = start_x + i;
                if x > sx && x < sx + sw && cy > sy && cy < sy + sh {
                    grid[cy][x] = ch;
                }
            }
        }
    }

    let mut result = String::new();
    for row in &grid {
        let line: String = row.iter().collect();
        result.push_str(line.trim_end());
        result.push('\n');
    }
    result
}

#[allow(clippy::needless_range_loop)]
fn draw_rect(grid: &mut [Vec<char>], x: usize, y: usize, w: usize, h: usize) {
    let rows = grid.len();
    let cols = if rows > 0 { grid[0].len() } else { return };

    // Horizontal edges
    for i in x..=x + w {
        if i < cols {
            if y < rows {
                grid[y][i] = if grid[y][i] == '|' || grid[y][i] == '+' {
                    '+'
                } else {
                    '-'
                };
            }
            if y + h < rows {
                grid[y + h][i] = if grid[y + h][i] == '|' || grid[y + h][i] == '+' {
                    '+'
                } else {
                    '-'
                };
            }
        }
    }

    // Vertical edges
    for j in y..=y + h {
        if j < rows {
            if x < cols {
                grid[j][x] = if grid[j][x] == '-' || grid[j][x] == '+' {
                    '+'
                } else {
                    '|'
                };
            }
            if x + w < cols {
                grid[j][x + w] = if grid[j][x + w] == '-' || grid[j][x + w] == '+' {
                    '+'
                } else {
                    '|'
                };
            }
        }
    }

    // Corners
    for &cx in &[x, x + w] {
        for &cy in &[y, y + h] {
            if cy < rows && cx < cols {
                grid[cy][cx] = '+';
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Grain;

    fn placement(x: u32, y: u32, w: u32, h: u32, original: Rect) -> Placement {
        Placement {
            part_id: "p".to_string(),
            x,
            y,
            w,
            h,
            rotated: false,
            grain: Grain::Any,
            original,
            label: None,
        }
    }

    #[test]
    fn test_render_single_part() {
        let stock = Rect::new(1000, 2000);
        let placements = vec![placement(0, 0, 2000, 1000, Rect::new(1000, 2000))];
        let output = render_sheet(stock, &placements);
        assert!(output.contains('+'));
        assert!(output.contains('-'));
        assert!(output.contains('|'));
        assert!(output.contains("1000x2000"));
    }

    #[test]
    fn test_render_two_parts() {
        let stock = Rect::new(1000, 1000);
        let placements = vec![
            placement(0, 0, 500, 1000, Rect::new(1000, 500)),
            placement(500, 0, 500, 1000, Rect::new(1000, 500)),
        ];
        let output = render_sheet(stock, &placements);
        assert!(output.contains("1000x500"));
    }

    #[test]
    fn test_render_empty_sheet_keeps_border() {
        let stock = Rect::new(1000, 1000);
        let output = render_sheet(stock, &[]);
        assert!(output.contains('+'));
    }
}
