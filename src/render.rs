use crate::margins::MarginConfig;
use crate::types::{LayoutResult, PrintableArea, TrimSize};

const MAX_WIDTH: f64 = 80.0;
const MAX_HEIGHT: f64 = 40.0;

/// ASCII preview of an imposition grid on the printable area. Width runs
/// left to right with the gripper edge on the left.
pub fn render_imposition(
    printable: PrintableArea,
    trim: TrimSize,
    layout: &LayoutResult,
    margins: &MarginConfig,
) -> String {
    let scale = f64::min(MAX_WIDTH / printable.width, MAX_HEIGHT / printable.height);
    let grid_w = (printable.width * scale).round() as usize;
    let grid_h = (printable.height * scale).round() as usize;

    if grid_w == 0 || grid_h == 0 {
        return String::new();
    }

    let mut grid = vec![vec![' '; grid_w + 1]; grid_h + 1];

    // Sheet border first
    draw_rect(&mut grid, 0, 0, grid_w, grid_h);

    let item = if layout.rotated { trim.rotated() } else { trim };
    let step_w = item.width + margins.gap;
    let step_h = item.height + margins.gap;
    let origin_x = margins.gripper + margins.bleed;
    let origin_y = margins.bleed;

    let label = format!("{}x{}", item.width, item.height);
    let label_chars: Vec<char> = label.chars().collect();

    for row in 0..layout.rows {
        for col in 0..layout.cols {
            let x = origin_x + col as f64 * step_w;
            let y = origin_y + row as f64 * step_h;

            let sx = (x * scale).round() as usize;
            let sy = (y * scale).round() as usize;
            let sw = (item.width * scale).round() as usize;
            let sh = (item.height * scale).round() as usize;

            if sw == 0 || sh == 0 {
                continue;
            }

            draw_rect(&mut grid, sx, sy, sw, sh);

            // Center the dimension label when the cell is wide enough
            if sw > label_chars.len() + 1 && sh > 1 {
                let cx = sx + sw / 2;
                let cy = sy + sh / 2;
                let start_x = cx.saturating_sub(label_chars.len() / 2);
                for (i, &ch) in label_chars.iter().enumerate() {
                    let gx = start_x + i;
                    if gx > sx && gx < sx + sw && cy > sy && cy < sy + sh {
                        grid[cy][gx] = ch;
                    }
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

fn draw_rect(grid: &mut [Vec<char>], x: usize, y: usize, w: usize, h: usize) {
    let rows = grid.len();
    let cols = if rows > 0 { grid[0].len() } else { return };

    // Horizontal edges
    for i in x..=x + w {
        if i < cols {
            for &row in &[y, y + h] {
                if row < rows {
                    grid[row][i] = if grid[row][i] == '|' || grid[row][i] == '+' {
                        '+'
                    } else {
                        '-'
                    };
                }
            }
        }
    }

    // Vertical edges
    for j in y..=y + h {
        if j < rows {
            for &col in &[x, x + w] {
                if col < cols {
                    grid[j][col] = if grid[j][col] == '-' || grid[j][col] == '+' {
                        '+'
                    } else {
                        '|'
                    };
                }
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
    use crate::layout::compute_items_per_sheet;

    #[test]
    fn test_render_sra3_grid() {
        let trim = TrimSize::new(50.0, 90.0);
        let printable = PrintableArea::new(320.0, 450.0);
        let margins = MarginConfig::default();
        let layout = compute_items_per_sheet(trim, printable, &margins).unwrap();
        assert_eq!(layout.items_per_sheet, 24);

        let output = render_imposition(printable, trim, &layout, &margins);
        assert!(output.contains('+'));
        assert!(output.contains('-'));
        assert!(output.contains('|'));
    }

    #[test]
    fn test_render_labels_wide_cells() {
        let trim = TrimSize::new(140.0, 200.0);
        let printable = PrintableArea::new(320.0, 450.0);
        let margins = MarginConfig::default();
        let layout = compute_items_per_sheet(trim, printable, &margins).unwrap();
        assert_eq!(layout.items_per_sheet, 4);

        let output = render_imposition(printable, trim, &layout, &margins);
        assert!(output.contains("140x200"));
    }

    #[test]
    fn test_render_rotated_layout_labels_swapped_dims() {
        let trim = TrimSize::new(315.0, 100.0);
        let printable = PrintableArea::new(320.0, 450.0);
        let margins = MarginConfig::default();
        let layout = compute_items_per_sheet(trim, printable, &margins).unwrap();
        assert!(layout.rotated);

        let output = render_imposition(printable, trim, &layout, &margins);
        assert!(output.contains("100x315"));
    }

    #[test]
    fn test_render_empty_layout_draws_border_only() {
        let trim = TrimSize::new(400.0, 500.0);
        let printable = PrintableArea::new(320.0, 450.0);
        let margins = MarginConfig::default();
        let layout = compute_items_per_sheet(trim, printable, &margins).unwrap();
        assert!(!layout.fits);

        let output = render_imposition(printable, trim, &layout, &margins);
        assert!(output.contains('+'));
        assert!(!output.contains("400x500"));
    }
}
