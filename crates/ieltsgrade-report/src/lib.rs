//! ieltsgrade-report: rendered score cards for grade reports.

pub mod html;
