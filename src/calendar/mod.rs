mod grid;
mod widget;
pub(crate) use self::grid::MonthGrid;
pub(crate) use self::widget::{CalendarView, MAIN_WIDTH};
