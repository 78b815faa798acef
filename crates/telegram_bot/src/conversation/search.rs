use super::{Context, Effect, Next, Step};
use crate::{
    pagination::Direction,
    session::{FlowState, SearchCursor, SearchState},
    ui,
};

pub(super) fn start() -> Step {
    Step::goto(FlowState::Search(SearchState::GetQuery), ui::search_prompt())
}

pub(super) fn on_text(state: &SearchState, text: &str, ctx: &Context) -> Step {
    match state {
        SearchState::GetQuery if text.is_empty() => Step::stay(ui::search_prompt()),
        SearchState::GetQuery => {
            let cursor = SearchCursor {
                query: text.to_string(),
                offset: 0,
                page_size: ctx.page_size.max(1),
            };
            // The controller ends the flow instead when nothing matches.
            Step::run(
                Effect::Search(cursor.clone()),
                Next::Goto(FlowState::Search(SearchState::Paginate(cursor))),
            )
        }
        SearchState::Paginate(_) => Step::stay(ui::search_use_buttons()),
    }
}

/// A page button. The offset comes from the pressed button so an older
/// message still pages relative to what it shows.
pub(super) fn on_page(state: &SearchState, direction: Direction, offset: usize) -> Step {
    match state {
        SearchState::Paginate(cursor) => Step::run(
            Effect::Page {
                cursor: SearchCursor {
                    offset,
                    ..cursor.clone()
                },
                direction,
            },
            Next::Keep,
        ),
        SearchState::GetQuery => Step::notice(ui::BUTTON_EXPIRED),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        conversation::{
            dispatch,
            tests::{ctx, text},
        },
        event::{ButtonAction, Event},
    };

    fn paginate(offset: usize) -> FlowState {
        FlowState::Search(SearchState::Paginate(SearchCursor {
            query: "coffee".to_string(),
            offset,
            page_size: 10,
        }))
    }

    #[test]
    fn query_starts_at_offset_zero() {
        let state = FlowState::Search(SearchState::GetQuery);
        let step = dispatch(Some(&state), &text("coffee"), &ctx());
        let cursor = SearchCursor {
            query: "coffee".to_string(),
            offset: 0,
            page_size: 10,
        };
        assert_eq!(step.effect, Some(Effect::Search(cursor)));
        assert_eq!(step.next, Next::Goto(paginate(0)));
    }

    #[test]
    fn buttons_page_from_their_own_offset() {
        let event = Event::Button(ButtonAction::SearchPage {
            direction: Direction::Next,
            offset: 10,
        });
        let step = dispatch(Some(&paginate(20)), &event, &ctx());
        assert_eq!(
            step.effect,
            Some(Effect::Page {
                cursor: SearchCursor {
                    query: "coffee".to_string(),
                    offset: 10,
                    page_size: 10,
                },
                direction: Direction::Next,
            })
        );
        assert_eq!(step.next, Next::Keep);
    }

    #[test]
    fn text_while_paging_points_at_buttons() {
        let step = dispatch(Some(&paginate(0)), &text("tea"), &ctx());
        assert_eq!(step.next, Next::Keep);
        assert_eq!(step.effect, None);
        assert_eq!(step.reply, Some(ui::search_use_buttons()));
    }

    #[test]
    fn page_button_before_query_has_expired() {
        let state = FlowState::Search(SearchState::GetQuery);
        let event = Event::Button(ButtonAction::SearchPage {
            direction: Direction::Prev,
            offset: 0,
        });
        let step = dispatch(Some(&state), &event, &ctx());
        assert_eq!(step.notice, Some(ui::BUTTON_EXPIRED));
        assert_eq!(step.effect, None);
    }
}
