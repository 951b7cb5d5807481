pub mod buffer;
pub mod command;
pub mod cursor;
pub mod enums;
pub mod errors;
pub mod history;
pub mod operation;
pub mod piece_table;

pub use buffer::EditBuffer;
pub use command::{BinaryDataCommand, compound::CompoundCommand, data::DataCommand};
pub use cursor::{Cursor, Position};
pub use errors::{EditError, EditResult};
pub use history::{UndoHandler, UndoUpdateListener};
pub use operation::Operation;
