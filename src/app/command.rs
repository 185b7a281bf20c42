use crate::app::state::Ticket;
use crate::domain::favorites::Favorites;
use crate::domain::models::EntityInfo;
use crate::domain::protocol::OutboundMessage;

#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    OpenSession,
    CloseSession,
    Send(OutboundMessage),
    LoadMetadata { ticket: Ticket, force: bool },
    SearchRecords { ticket: Ticket, entity: EntityInfo, text: String }, // Debounced
    SearchUsers { user_name: String },                                 // Debounced
    CancelSearches,
    RunFetchXml { ticket: Ticket, xml: String, entity_name: String },
    LoadRecordDetails { ticket: Ticket, entity: String, id: String },
    LoadRoles { ticket: Ticket },
    LoadEntityMetadata { ticket: Ticket, entity: String },
    LoadEnvironment { ticket: Ticket, app_id: Option<String> },
    SaveFavorites(Favorites),
    Batch(Vec<Command>),
}
