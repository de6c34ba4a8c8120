pub mod check;
pub mod configure;
pub mod serve;
