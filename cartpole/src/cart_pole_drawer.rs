use console_engine::pixel;
use console_engine::screen::Screen;

use crate::cart_pole_environment::X_THRESHOLD;

const WIDTH: u32 = 61;
const HEIGHT: u32 = 12;
const TRACK_Y: i32 = HEIGHT as i32 - 1;
const CART_Y: i32 = TRACK_Y - 1;
/// pole length in rows
const POLE_LEN: f64 = 7.0;
/// terminal cells are roughly twice as high as wide
const ASPECT: f64 = 2.0;

/// Character picture of the cart, the pole and the track
pub fn draw(state: &[f64; 4], steps: usize) -> Screen {
    let mut screen = Screen::new_empty(WIDTH, HEIGHT);
    screen.clear();

    let [x, _, theta, _] = *state;
    screen.print(0, 0, &format!("step {:>4}  x={:+.2}  θ={:+.1}°", steps, x, theta.to_degrees()));

    screen.line(0, TRACK_Y, WIDTH as i32 - 1, TRACK_Y, pixel::pxl('─'));

    let cart_x = cart_column(x);
    screen.print((cart_x - 2).clamp(0, WIDTH as i32 - 4), CART_Y, "[██]");

    let tip_x = (cart_x as f64 + POLE_LEN * ASPECT * theta.sin()).clamp(0.0, WIDTH as f64 - 1.0);
    let tip_y = (CART_Y as f64 - POLE_LEN * theta.cos()).clamp(1.0, CART_Y as f64 - 1.0);
    screen.line(cart_x, CART_Y - 1, tip_x.round() as i32, tip_y.round() as i32, pixel::pxl('●'));

    screen
}

/// Maps the cart position onto a screen column; positions beyond the track end are clamped
fn cart_column(x: f64) -> i32 {
    let rel = ((x + X_THRESHOLD) / (2.0 * X_THRESHOLD)).clamp(0.0, 1.0);
    (rel * (WIDTH as f64 - 1.0)).round() as i32
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cart_column() {
        assert_eq!(cart_column(0.0), 30);
        assert_eq!(cart_column(-X_THRESHOLD), 0);
        assert_eq!(cart_column(X_THRESHOLD), 60);
        assert_eq!(cart_column(100.0), 60);
    }

    #[test]
    fn test_draw_extreme_states() {
        for state in [[0.0; 4], [-3.0, 0.0, -1.5, 0.0], [3.0, 0.0, 1.5, 0.0]] {
            draw(&state, 200);
        }
    }
}
