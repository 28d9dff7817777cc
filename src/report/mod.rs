pub mod category;
pub mod daily;
pub mod group;
pub mod interval;
pub mod kpi;
pub mod shift;
