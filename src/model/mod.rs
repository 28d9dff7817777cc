pub mod action;
pub mod card;
pub mod member;
pub mod webhook;
