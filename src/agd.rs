//! Accelerated gradient descent, the unconstrained baseline.

use crate::objective::ObjectiveFunction;
use crate::solution::{Solution, Termination};
use log::{debug, trace};
use ndarray::prelude::*;
use ndarray::NdFloat;
use num_traits::Float;

/// Nesterov-accelerated gradient descent on a smooth objective, with no
/// feasibility region.
///
/// Steps of size `1/L` are taken from a momentum point that
/// extrapolates the last two iterates through the usual
/// $`\theta_k = (1 + \sqrt{4\theta_{k-1}^2 + 1})/2`$ sequence. Starting
/// point is the origin. The recorded gap analog is the gradient norm at
/// each momentum point; the loss is recorded after every step.
#[derive(Debug)]
pub struct AcceleratedGradientDescent<'a, O, S> {
    objective_function: &'a O,
    dimension: usize,
    max_iterations: usize,
    tolerance: S,
}

impl<'a, O, S> AcceleratedGradientDescent<'a, O, S>
where
    O: ObjectiveFunction<S>,
    S: NdFloat,
{
    pub fn new(objective_function: &'a O, dimension: usize, max_iterations: usize) -> Self {
        AcceleratedGradientDescent {
            objective_function,
            dimension,
            max_iterations,
            tolerance: S::zero(),
        }
    }

    /// Stops once the gradient norm at the momentum point falls to
    /// `tolerance`. The default `0` keeps the check alive only for an
    /// exactly stationary point.
    pub fn with_tolerance(mut self, tolerance: S) -> Self {
        self.tolerance = tolerance;
        self
    }

    /// Runs the iteration to termination. Unconstrained and step-size
    /// bound, so nothing can fail.
    pub fn optimize(&self) -> Solution<S> {
        let two = S::from(2.).unwrap();
        let four = S::from(4.).unwrap();
        let step = S::one() / self.objective_function.smoothness_constant();
        debug!(
            "accelerated gradient descent in {} dimensions: step {}, at most {} iterations",
            self.dimension, step, self.max_iterations
        );

        let mut x: Array1<S> = Array1::zeros(self.dimension);
        let mut y = x.clone();
        let mut theta = S::one();

        let mut loss_history = Vec::with_capacity(self.max_iterations + 1);
        loss_history.push(self.objective_function.evaluate_loss(x.view()));
        let mut gap_history = Vec::with_capacity(self.max_iterations);
        let mut termination = Termination::MaxIterationsReached;
        let mut iterations = 0;

        while iterations < self.max_iterations {
            let gradient = self.objective_function.evaluate_gradient(y.view());
            let norm = gradient.dot(&gradient).sqrt();
            gap_history.push(norm);
            if norm <= self.tolerance {
                termination = Termination::Converged;
                break;
            }

            let theta_old = theta;
            theta = (S::one() + (four * theta.powi(2) + S::one()).sqrt()) / two;
            let beta = (theta_old - S::one()) / theta;

            let x_old = x.to_owned();
            x = y - &gradient * step;
            y = &x + &((&x - &x_old) * beta);
            iterations += 1;

            let loss = self.objective_function.evaluate_loss(x.view());
            loss_history.push(loss);
            trace!(
                "it {:>4}: gradient norm {}, loss {}",
                iterations,
                norm,
                loss
            );
        }

        debug!(
            "accelerated gradient descent stopped after {} iterations: {:?}",
            iterations, termination
        );
        Solution {
            iterate: x,
            loss_history,
            gap_history,
            iterations,
            termination,
        }
    }
}
