//! Scenario drivers
//!
//! Each scenario builds the components on a [`ManualClock`], feeds them the
//! nested-scroll calls a scrolling list would make, and samples every frame
//! the [`AnimationScheduler`] runs until everything is at rest.

use std::cell::RefCell;
use std::rc::Rc;

use anyhow::{bail, ensure, Result};

use miuix_animation::{AnimationScheduler, FrameClock, FrameTicker, ManualClock};
use miuix_core::{
    FlingObserver, ListenerRegistry, NestedScrollSink, Rect, ScrollAxes, ScrollState,
    ScrollStateEmitter, ScrollTarget, ScrollType,
};
use miuix_layout::{AppBar, AppBarRenderValues, MiuixConfig, SpringBackLayout};

const MAX_FRAMES: usize = 1000;

/// Drag steps fed to the container while pulling (px)
const DRAG_STEP: i32 = 20;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PullEdge {
    Top,
    Bottom,
}

/// Container position after one frame
#[derive(Debug, Clone, Copy)]
pub struct LayoutFrame {
    pub time_ms: u64,
    pub x: i32,
    pub y: i32,
    pub state: ScrollState,
}

/// App bar offset and render values after one frame
#[derive(Debug, Clone, Copy)]
pub struct AppBarFrame {
    pub time_ms: u64,
    pub offset: i32,
    pub values: AppBarRenderValues,
}

/// A list resting against one of its edges
struct ListAtEdge(PullEdge);

impl ScrollTarget for ListAtEdge {
    fn can_scroll_vertically(&self, direction: i32) -> bool {
        match self.0 {
            PullEdge::Top => direction > 0,
            PullEdge::Bottom => direction < 0,
        }
    }

    fn can_scroll_horizontally(&self, _direction: i32) -> bool {
        false
    }

    fn window_bounds(&self) -> Rect {
        Rect::default()
    }
}

struct Stage {
    clock: ManualClock,
    scheduler: AnimationScheduler,
    frame_ms: u64,
}

impl Stage {
    fn new(frame_ms: u64) -> Result<Self> {
        ensure!(frame_ms > 0, "frame interval must be positive");
        let clock = ManualClock::new(0);
        let scheduler = AnimationScheduler::new(Rc::new(clock.clone()));
        Ok(Self {
            clock,
            scheduler,
            frame_ms,
        })
    }

    fn frame_clock(&self) -> Rc<dyn FrameClock> {
        Rc::new(self.clock.clone())
    }

    /// Tick until nothing is scheduled, sampling after every frame
    fn run(&self, mut sample: impl FnMut(u64)) -> Result<()> {
        let mut frames = 0;
        while self.scheduler.has_active_animations() {
            let now = self.clock.advance(self.frame_ms);
            self.scheduler.tick();
            sample(now);
            frames += 1;
            if frames >= MAX_FRAMES {
                bail!("animation still running after {} frames", MAX_FRAMES);
            }
        }
        tracing::info!("settled after {} frames", frames);
        Ok(())
    }

    fn layout(&self, config: &MiuixConfig, edge: PullEdge) -> Rc<RefCell<SpringBackLayout>> {
        let layout = Rc::new(RefCell::new(SpringBackLayout::new(
            &config.spring_back,
            self.frame_clock(),
        )));
        let ticker: Rc<RefCell<dyn FrameTicker>> = layout.clone();
        {
            let mut layout = layout.borrow_mut();
            layout.set_target(Box::new(ListAtEdge(edge)));
            layout.set_frame_requester(Some(self.scheduler.requester_for(&ticker)));
        }
        layout
    }
}

fn sample_layout(layout: &SpringBackLayout, time_ms: u64) -> LayoutFrame {
    LayoutFrame {
        time_ms,
        x: layout.scroll_x(),
        y: layout.scroll_y(),
        state: layout.scroll_state(),
    }
}

fn edge_sign(edge: PullEdge) -> i32 {
    match edge {
        PullEdge::Top => -1,
        PullEdge::Bottom => 1,
    }
}

/// Drag `distance` px past `edge`, then release
pub fn pull_and_release(
    config: &MiuixConfig,
    edge: PullEdge,
    distance: i32,
    frame_ms: u64,
) -> Result<Vec<LayoutFrame>> {
    ensure!(distance > 0, "distance must be positive, got {}", distance);
    let stage = Stage::new(frame_ms)?;
    let layout = stage.layout(config, edge);
    let mut frames = Vec::new();

    {
        let mut layout = layout.borrow_mut();
        if !layout.on_start_nested_scroll(ScrollAxes::VERTICAL, ScrollType::Touch) {
            bail!("spring-back is disabled or not vertical in this config");
        }
        layout.on_nested_scroll_accepted(ScrollAxes::VERTICAL, ScrollType::Touch);

        let mut remaining = distance;
        while remaining > 0 {
            let step = remaining.min(DRAG_STEP);
            layout.on_nested_scroll(0, 0, 0, edge_sign(edge) * step, ScrollType::Touch);
            let now = stage.clock.advance(frame_ms);
            frames.push(sample_layout(&layout, now));
            remaining -= step;
        }
        if layout.scroll_y() == 0 {
            bail!("{:?} edge did not overscroll; check spring_back_mode", edge);
        }
        layout.on_stop_nested_scroll(ScrollType::Touch);
    }

    stage.run(|now| frames.push(sample_layout(&layout.borrow(), now)))?;
    Ok(frames)
}

/// Fling into `edge` at `velocity` px/s with `distance` px left over on impact
pub fn fling_into_edge(
    config: &MiuixConfig,
    edge: PullEdge,
    distance: i32,
    velocity: f32,
    frame_ms: u64,
) -> Result<Vec<LayoutFrame>> {
    ensure!(distance > 0, "distance must be positive, got {}", distance);
    ensure!(
        velocity.is_finite() && velocity != 0.0,
        "fling velocity must be non-zero"
    );
    let stage = Stage::new(frame_ms)?;
    let layout = stage.layout(config, edge);

    {
        let mut layout = layout.borrow_mut();
        if !layout.on_start_nested_scroll(ScrollAxes::VERTICAL, ScrollType::NonTouch) {
            bail!("spring-back is disabled or not vertical in this config");
        }
        layout.on_nested_scroll_accepted(ScrollAxes::VERTICAL, ScrollType::NonTouch);
        let sign = edge_sign(edge);
        layout.on_nested_current_fling(0.0, sign as f32 * velocity.abs());
        layout.on_nested_scroll(0, sign, 0, sign * distance, ScrollType::NonTouch);
        layout.on_stop_nested_scroll(ScrollType::NonTouch);
    }

    let mut frames = Vec::new();
    stage.run(|now| frames.push(sample_layout(&layout.borrow(), now)))?;
    Ok(frames)
}

/// Release an app bar held at `offset` and let it snap
pub fn release_app_bar(
    config: &MiuixConfig,
    range: i32,
    offset: i32,
    scroll_down: bool,
    frame_ms: u64,
) -> Result<Vec<AppBarFrame>> {
    ensure!(range > 0, "range must be positive, got {}", range);
    ensure!(
        offset > 0 && offset < range,
        "offset {} must lie strictly inside (0, {})",
        offset,
        range
    );
    let stage = Stage::new(frame_ms)?;
    let bar = Rc::new(RefCell::new(AppBar::new(
        config.app_bar.clone(),
        Rc::new(ListenerRegistry::new()),
        stage.frame_clock(),
    )));
    let ticker: Rc<RefCell<dyn FrameTicker>> = bar.clone();

    {
        let mut bar = bar.borrow_mut();
        bar.set_frame_requester(Some(stage.scheduler.requester_for(&ticker)));
        bar.set_collapsible_scroll_range(range);
        bar.set_current_scroll_offset(offset);
        bar.on_nested_scroll_accepted(ScrollAxes::VERTICAL, ScrollType::Touch);
        if scroll_down {
            bar.on_nested_pre_scroll(0, -1, ScrollType::Touch);
        }
        bar.on_stop_nested_scroll(ScrollType::Touch);
    }

    let mut frames = Vec::new();
    stage.run(|now| {
        let bar = bar.borrow();
        frames.push(AppBarFrame {
            time_ms: now,
            offset: bar.current_scroll_offset(),
            values: bar.render_values(),
        });
    })?;
    Ok(frames)
}
