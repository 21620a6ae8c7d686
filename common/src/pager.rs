/// Callback payload prefix for forecast page buttons.
pub const DAY_CALLBACK_PREFIX: &str = "day:";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageStep {
    Prev,
    Next,
}

/// Day cursor over a multi-day forecast, stepped by inline keyboard buttons.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ForecastPager {
    day: usize,
    days: usize,
}

impl ForecastPager {
    pub fn new(days: usize) -> Self {
        Self { day: 0, days }
    }

    pub fn at(days: usize, day: usize) -> Self {
        let mut pager = Self::new(days);
        pager.goto(day);
        pager
    }

    pub fn day(&self) -> usize {
        self.day
    }

    pub fn days(&self) -> usize {
        self.days
    }

    pub fn goto(&mut self, day: usize) -> usize {
        self.day = day.min(self.days.saturating_sub(1));
        self.day
    }

    pub fn step(&mut self, step: PageStep) -> usize {
        match step {
            PageStep::Prev => self.goto(self.day.saturating_sub(1)),
            PageStep::Next => self.goto(self.day.saturating_add(1)),
        }
    }

    /// Callback payload for the button moving in `step`, if that move is possible.
    pub fn callback_for(&self, step: PageStep) -> Option<String> {
        let mut moved = *self;
        if moved.step(step) == self.day {
            return None;
        }
        Some(format!("{DAY_CALLBACK_PREFIX}{}", moved.day))
    }

    pub fn parse_callback(data: &str) -> Option<usize> {
        data.strip_prefix(DAY_CALLBACK_PREFIX)?.parse().ok()
    }
}
