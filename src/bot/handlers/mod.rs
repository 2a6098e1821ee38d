pub mod callback;
pub mod message;

use teloxide::{dispatching::UpdateHandler, prelude::*};

use crate::bot::commands::Command;

pub type HandlerResult = Result<(), Box<dyn std::error::Error + Send + Sync>>;

/// The dispatch tree: slash commands, then edit callbacks, then menu and
/// free-text messages. Handlers receive `Arc<AppContext>` from the
/// dispatcher's dependency map.
pub fn schema() -> UpdateHandler<Box<dyn std::error::Error + Send + Sync + 'static>> {
    use teloxide::dispatching::UpdateFilterExt;

    dptree::entry()
        .branch(
            Update::filter_message()
                .filter_command::<Command>()
                .endpoint(message::command_handler),
        )
        .branch(Update::filter_callback_query().endpoint(callback::callback_handler))
        .branch(Update::filter_message().endpoint(message::message_handler))
}
