// Copyright @yucwang 2021

pub mod mis;
pub mod path;
pub mod path_state;
pub mod roulette;
