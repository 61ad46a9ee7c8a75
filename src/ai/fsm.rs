//! Finite State Machine for mob motion
//!
//! A small generic state machine with enter/update/exit hooks, plus the
//! three motion states a mob moves between:
//!
//! - `Wandering`: no target in range and no path held
//! - `Pursuing`: the target is inside the detection radius
//! - `FollowingPath`: the target is out of range but a path is held
//!
//! # Example
//!
//! ```ignore
//! let mut fsm = StateMachine::new(Wandering);
//! let mut ctx = MotionContext::new(target_distance, detect_radius, has_path);
//! fsm.update(&mut ctx);
//! match ctx.behaviour { Behaviour::Pursue => { /* ... */ } _ => {} }
//! ```

use std::fmt;

// ============================================================================
// State Trait
// ============================================================================

/// A state in the finite state machine.
///
/// The lifecycle is:
///
/// 1. `enter()` - Called once when entering this state
/// 2. `update()` - Called each tick while in this state
/// 3. `exit()` - Called once when leaving this state
pub trait State<Ctx = ()>: fmt::Debug + Send + Sync {
    /// State name for debugging and logging.
    fn name(&self) -> &'static str;

    /// Called when entering this state.
    fn enter(&mut self, _ctx: &mut Ctx) {}

    /// Called each tick while in this state.
    ///
    /// Returns a `Transition` to indicate whether to stay or change states.
    fn update(&mut self, ctx: &mut Ctx) -> Transition<Ctx>;

    /// Called when exiting this state.
    fn exit(&mut self, _ctx: &mut Ctx) {}
}

// ============================================================================
// Transition
// ============================================================================

/// Represents a state transition decision.
pub enum Transition<Ctx = ()> {
    /// Stay in the current state.
    None,
    /// Transition to a new state.
    To(Box<dyn State<Ctx>>),
}

impl<Ctx> Transition<Ctx> {
    /// Create a transition to a new state.
    pub fn to<S: State<Ctx> + 'static>(state: S) -> Self {
        Transition::To(Box::new(state))
    }
}

impl<Ctx> fmt::Debug for Transition<Ctx> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Transition::None => write!(f, "Transition::None"),
            Transition::To(state) => write!(f, "Transition::To({})", state.name()),
        }
    }
}

// ============================================================================
// State Machine
// ============================================================================

/// A finite state machine that manages state transitions.
///
/// # Type Parameters
///
/// - `Ctx`: Context type passed to state methods
pub struct StateMachine<Ctx = ()> {
    /// Current active state
    current: Box<dyn State<Ctx>>,
    /// Whether enter() has been called on current state
    entered: bool,
}

impl<Ctx> StateMachine<Ctx> {
    /// Create a new state machine with an initial state.
    ///
    /// The initial state's `enter()` will be called on the first `update()`.
    pub fn new<S: State<Ctx> + 'static>(initial: S) -> Self {
        Self {
            current: Box::new(initial),
            entered: false,
        }
    }

    /// Update the state machine.
    ///
    /// Calls `enter()` on first update, then `update()` each tick.
    /// Handles transitions by calling `exit()` on old state and `enter()` on new.
    pub fn update(&mut self, ctx: &mut Ctx) {
        if !self.entered {
            self.current.enter(ctx);
            self.entered = true;
        }

        let transition = self.current.update(ctx);

        if let Transition::To(mut new_state) = transition {
            log::trace!("{} -> {}", self.current.name(), new_state.name());
            self.current.exit(ctx);
            new_state.enter(ctx);
            self.current = new_state;
            self.entered = true;
        }
    }

    /// Get the name of the current state.
    #[must_use]
    pub fn current_state_name(&self) -> &'static str {
        self.current.name()
    }

    /// Check if the FSM is in a state with the given name.
    #[must_use]
    pub fn is_in_state(&self, name: &str) -> bool {
        self.current.name() == name
    }
}

impl<Ctx> fmt::Debug for StateMachine<Ctx> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StateMachine")
            .field("current", &self.current.name())
            .field("entered", &self.entered)
            .finish()
    }
}

// ============================================================================
// Motion States
// ============================================================================

/// Which steering blend the mob applies this tick
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Behaviour {
    /// Wander plus flocking
    #[default]
    Wander,
    /// Pursue the target plus flocking
    Pursue,
    /// Follow the held path plus flocking
    FollowPath,
}

/// Sensor readings the motion states decide on
#[derive(Debug, Clone, Copy, Default)]
pub struct MotionContext {
    /// Distance to the pursued target
    pub target_distance: f32,
    /// Detection radius of the mob
    pub detect_radius: f32,
    /// Whether the mob holds a path
    pub has_path: bool,
    /// Output: blend chosen by the active state
    pub behaviour: Behaviour,
}

impl MotionContext {
    /// Build a context for this tick
    #[must_use]
    pub fn new(target_distance: f32, detect_radius: f32, has_path: bool) -> Self {
        Self {
            target_distance,
            detect_radius,
            has_path,
            behaviour: Behaviour::default(),
        }
    }

    fn target_detected(&self) -> bool {
        self.target_distance < self.detect_radius
    }
}

/// No target in sight, no route: meander.
#[derive(Debug, Default, Clone, Copy)]
pub struct Wandering;

impl State<MotionContext> for Wandering {
    fn name(&self) -> &'static str {
        "Wandering"
    }

    fn enter(&mut self, ctx: &mut MotionContext) {
        ctx.behaviour = Behaviour::Wander;
    }

    fn update(&mut self, ctx: &mut MotionContext) -> Transition<MotionContext> {
        if ctx.target_detected() {
            return Transition::to(Pursuing);
        }
        if ctx.has_path {
            return Transition::to(FollowingPath);
        }
        ctx.behaviour = Behaviour::Wander;
        Transition::None
    }
}

/// Target inside the detection radius: intercept it.
#[derive(Debug, Default, Clone, Copy)]
pub struct Pursuing;

impl State<MotionContext> for Pursuing {
    fn name(&self) -> &'static str {
        "Pursuing"
    }

    fn enter(&mut self, ctx: &mut MotionContext) {
        ctx.behaviour = Behaviour::Pursue;
    }

    fn update(&mut self, ctx: &mut MotionContext) -> Transition<MotionContext> {
        if ctx.target_detected() {
            ctx.behaviour = Behaviour::Pursue;
            return Transition::None;
        }
        if ctx.has_path {
            Transition::to(FollowingPath)
        } else {
            Transition::to(Wandering)
        }
    }
}

/// Target out of range but a route is held: walk it.
#[derive(Debug, Default, Clone, Copy)]
pub struct FollowingPath;

impl State<MotionContext> for FollowingPath {
    fn name(&self) -> &'static str {
        "FollowingPath"
    }

    fn enter(&mut self, ctx: &mut MotionContext) {
        ctx.behaviour = Behaviour::FollowPath;
    }

    fn update(&mut self, ctx: &mut MotionContext) -> Transition<MotionContext> {
        if ctx.target_detected() {
            return Transition::to(Pursuing);
        }
        if !ctx.has_path {
            return Transition::to(Wandering);
        }
        ctx.behaviour = Behaviour::FollowPath;
        Transition::None
    }
}

// ============================================================================
// Tests
// ============================================================================
