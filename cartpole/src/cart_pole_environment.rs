use std::f64::consts::PI;

use anyhow::Result;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use ql::prelude::{ActionIndex, Environment, Observation, QlError, Step};

use crate::cart_pole_drawer;

const GRAVITY: f64 = 9.8;
const MASS_CART: f64 = 1.0;
const MASS_POLE: f64 = 0.1;
const TOTAL_MASS: f64 = MASS_CART + MASS_POLE;
/// half the pole's length
const LENGTH: f64 = 0.5;
const POLE_MASS_LENGTH: f64 = MASS_POLE * LENGTH;
const FORCE_MAG: f64 = 10.0;
/// seconds between state updates
const TAU: f64 = 0.02;

/// Episode fails when the pole leans further than 12° or the cart leaves the track
pub const THETA_THRESHOLD_RADIANS: f64 = 12.0 * 2.0 * PI / 360.0;
pub const X_THRESHOLD: f64 = 2.4;

pub const PUSH_LEFT: ActionIndex = 0;
pub const PUSH_RIGHT: ActionIndex = 1;

/// Supported environment ids with their episode step limit
const REGISTRY: [(&str, usize); 2] = [("CartPole-v0", 200), ("CartPole-v1", 500)];

/// Classic cart-pole balancing task (Barto, Sutton & Anderson 1983).
///
/// A pole is attached by an un-actuated joint to a cart moving along a frictionless track.
/// The agent pushes the cart left or right; every step the pole stays upright is rewarded with +1.
///
/// Observation: `[cart position, cart velocity, pole angle, pole angular velocity]`
pub struct CartPoleEnvironment {
    env_id: String,
    max_episode_steps: usize,
    rng: StdRng,
    state: Option<[f64; 4]>,
    steps: usize,
    done: bool,
}

impl CartPoleEnvironment {
    pub fn new(max_episode_steps: usize) -> Self {
        Self {
            env_id: "CartPole".to_string(),
            max_episode_steps,
            rng: StdRng::seed_from_u64(0),
            state: None,
            steps: 0,
            done: false,
        }
    }

    pub fn from_env_id(env_id: &str) -> Result<Self> {
        let (id, max_episode_steps) = REGISTRY
            .iter()
            .find(|(id, _)| *id == env_id)
            .ok_or_else(|| {
                let known: Vec<&str> = REGISTRY.iter().map(|(id, _)| *id).collect();
                QlError::Config(format!("unknown environment '{}', supported: {}", env_id, known.join(", ")))
            })?;
        let mut environment = Self::new(*max_episode_steps);
        environment.env_id = id.to_string();
        Ok(environment)
    }

    pub fn env_id(&self) -> &str {
        &self.env_id
    }

    pub fn state(&self) -> Option<[f64; 4]> {
        self.state
    }

    pub fn steps(&self) -> usize {
        self.steps
    }

    #[cfg(test)]
    fn with_state(state: [f64; 4]) -> Self {
        let mut environment = Self::new(200);
        environment.state = Some(state);
        environment
    }
}

impl Environment for CartPoleEnvironment {
    fn action_space(&self) -> usize {
        2
    }

    fn max_episode_steps(&self) -> usize {
        self.max_episode_steps
    }

    fn seed(&mut self, seed: u64) {
        self.rng = StdRng::seed_from_u64(seed);
    }

    fn reset(&mut self) -> Result<Observation> {
        let state = [0; 4].map(|_| self.rng.gen_range(-0.05..0.05));
        self.state = Some(state);
        self.steps = 0;
        self.done = false;
        Ok(state.to_vec())
    }

    fn step(&mut self, action: ActionIndex) -> Result<Step> {
        let [x, x_dot, theta, theta_dot] = match self.state {
            Some(_) if self.done => {
                return Err(QlError::Environment("step called on a finished episode; call reset first".to_string()).into())
            }
            Some(state) => state,
            None => return Err(QlError::Environment("step called before reset".to_string()).into()),
        };
        let force = match action {
            PUSH_LEFT => -FORCE_MAG,
            PUSH_RIGHT => FORCE_MAG,
            _ => return Err(QlError::Environment(format!("invalid action {}", action)).into()),
        };

        let (sin_theta, cos_theta) = theta.sin_cos();
        let temp = (force + POLE_MASS_LENGTH * theta_dot * theta_dot * sin_theta) / TOTAL_MASS;
        let theta_acc =
            (GRAVITY * sin_theta - cos_theta * temp) / (LENGTH * (4.0 / 3.0 - MASS_POLE * cos_theta * cos_theta / TOTAL_MASS));
        let x_acc = temp - POLE_MASS_LENGTH * theta_acc * cos_theta / TOTAL_MASS;

        // explicit euler
        let state = [
            x + TAU * x_dot,
            x_dot + TAU * x_acc,
            theta + TAU * theta_dot,
            theta_dot + TAU * theta_acc,
        ];
        self.state = Some(state);
        self.steps += 1;

        let fallen = state[0].abs() > X_THRESHOLD || state[2].abs() > THETA_THRESHOLD_RADIANS;
        self.done = fallen || self.steps >= self.max_episode_steps;

        Ok(Step {
            observation: state.to_vec(),
            reward: 1.0,
            done: self.done,
        })
    }

    fn render(&mut self) -> Result<()> {
        let state = self
            .state
            .ok_or_else(|| QlError::Environment("nothing to render before reset".to_string()))?;
        let screen = cart_pole_drawer::draw(&state, self.steps);
        screen.draw();
        println!();
        Ok(())
    }
}
