pub mod board;
pub mod card;
pub mod report;
pub mod webhook;
