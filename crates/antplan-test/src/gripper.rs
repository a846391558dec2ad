//! One-handed gripper.
//!
//! A robot moves between `rooma` and `roomb` and carries one ball at a time.
//! All balls start in `rooma`; the goal puts every ball in `roomb`.
//!
//! Variables: `robot` (0 = rooma, 1 = roomb), `hand` (0 = free, 1 = holding),
//! then one variable per ball (0 = rooma, 1 = roomb, 2 = held).

use antplan_core::{FactPair, Operator, PlanningTask, Variable};

/// Variable index of the robot location.
pub const ROBOT: usize = 0;
/// Variable index of the hand.
pub const HAND: usize = 1;

const ROOMS: [&str; 2] = ["rooma", "roomb"];
const HELD: usize = 2;

/// Variable index of ball `i`.
pub const fn ball(i: usize) -> usize {
    2 + i
}

/// Builds a gripper task with `balls` balls.
///
/// Operator order: `move-rooma-roomb`, `move-roomb-rooma`, then per ball
/// `pick` in each room followed by `drop` in each room.
pub fn gripper(balls: usize) -> PlanningTask {
    let mut variables = vec![
        Variable::new("robot", ["at-robby rooma", "at-robby roomb"]),
        Variable::new("hand", ["free left", "carrying left"]),
    ];
    for i in 0..balls {
        variables.push(Variable::new(
            format!("ball{i}"),
            [
                format!("at ball{i} rooma"),
                format!("at ball{i} roomb"),
                format!("carry ball{i} left"),
            ],
        ));
    }

    let mut operators = vec![
        Operator::new("move rooma roomb", 1)
            .with_precondition(ROBOT, 0)
            .with_effect(ROBOT, 1),
        Operator::new("move roomb rooma", 1)
            .with_precondition(ROBOT, 1)
            .with_effect(ROBOT, 0),
    ];
    for i in 0..balls {
        for (room, name) in ROOMS.iter().enumerate() {
            operators.push(
                Operator::new(format!("pick ball{i} {name} left"), 1)
                    .with_precondition(ROBOT, room)
                    .with_precondition(HAND, 0)
                    .with_precondition(ball(i), room)
                    .with_effect(ball(i), HELD)
                    .with_effect(HAND, 1),
            );
        }
        for (room, name) in ROOMS.iter().enumerate() {
            operators.push(
                Operator::new(format!("drop ball{i} {name} left"), 1)
                    .with_precondition(ROBOT, room)
                    .with_precondition(ball(i), HELD)
                    .with_effect(ball(i), room)
                    .with_effect(HAND, 0),
            );
        }
    }

    let goals = (0..balls).map(|i| FactPair::new(ball(i), 1)).collect();
    let mut initial = vec![0, 0];
    initial.extend(std::iter::repeat(0).take(balls));

    PlanningTask::new(variables, operators, goals, initial).expect("gripper fixture is valid")
}
