use engine::{DateRange, Period, ResultEngine};

use super::{Context, Effect, Next, Step};
use crate::{
    session::{FlowState, SummaryState},
    ui,
};

/// Report shape chosen by the user.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SummaryOption {
    ByCategory,
    AllTransactions,
}

impl SummaryOption {
    fn parse(text: &str) -> Option<Self> {
        if text.eq_ignore_ascii_case(ui::BY_CATEGORY) {
            Some(Self::ByCategory)
        } else if text.eq_ignore_ascii_case(ui::ALL_TRANSACTIONS) {
            Some(Self::AllTransactions)
        } else {
            None
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum PeriodChoice {
    Today,
    ThisWeek,
    ThisMonth,
    LastMonth,
    ThisYear,
    Month(Period),
}

impl PeriodChoice {
    fn parse(text: &str) -> Option<Self> {
        let choice = match text.to_ascii_lowercase().as_str() {
            "today" => Self::Today,
            "this week" => Self::ThisWeek,
            "this month" => Self::ThisMonth,
            "last month" => Self::LastMonth,
            "this year" => Self::ThisYear,
            other => Self::Month(other.parse().ok()?),
        };
        Some(choice)
    }

    fn range(self, ctx: &Context) -> ResultEngine<DateRange> {
        match self {
            Self::Today => DateRange::today(ctx.now, ctx.tz),
            Self::ThisWeek => DateRange::this_week(ctx.now, ctx.tz),
            Self::ThisMonth => DateRange::month(ctx.current_period(), ctx.tz),
            Self::LastMonth => DateRange::month(ctx.current_period().previous(), ctx.tz),
            Self::ThisYear => DateRange::this_year(ctx.now, ctx.tz),
            Self::Month(period) => DateRange::month(period, ctx.tz),
        }
    }
}

pub(super) fn start() -> Step {
    Step::goto(FlowState::Summary(SummaryState::ChoosePeriod), ui::period_menu())
}

pub(super) fn on_text(state: &SummaryState, text: &str, ctx: &Context) -> Step {
    match state {
        SummaryState::ChoosePeriod => {
            match PeriodChoice::parse(text).map(|choice| choice.range(ctx)) {
                Some(Ok(range)) => Step::goto(
                    FlowState::Summary(SummaryState::ChooseOption { range }),
                    ui::option_menu(),
                ),
                Some(Err(_)) | None => Step::stay(ui::invalid_period()),
            }
        }
        SummaryState::ChooseOption { range } => match SummaryOption::parse(text) {
            Some(option) => Step::run(
                Effect::Summary {
                    range: range.clone(),
                    option,
                },
                Next::End,
            ),
            None => Step::stay(ui::invalid_option()),
        },
    }
}
