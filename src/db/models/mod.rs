mod ativo;
mod common;
mod dashboard;
mod manutencao;
mod usuario;

pub use ativo::*;
pub use common::*;
pub use dashboard::*;
pub use manutencao::*;
pub use usuario::*;
