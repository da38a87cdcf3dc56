//! Entity module - Contains all SeaORM entity definitions for the database.
//! These entities represent the database tables and their relationships.
//! Each entity has a Model struct for data and an Entity struct for operations.

pub mod categoria;
pub mod cliente_frecuente;
pub mod colaborador;
pub mod insumo;
pub mod producto;
pub mod rol;

// Re-export specific types to avoid conflicts
pub use categoria::{Column as CategoriaColumn, Entity as Categoria, Model as CategoriaModel};
pub use cliente_frecuente::{
    Column as ClienteFrecuenteColumn, Entity as ClienteFrecuente, Model as ClienteFrecuenteModel,
};
pub use colaborador::{
    Column as ColaboradorColumn, Entity as Colaborador, Model as ColaboradorModel,
};
pub use insumo::{Column as InsumoColumn, Entity as Insumo, Model as InsumoModel};
pub use producto::{Column as ProductoColumn, Entity as Producto, Model as ProductoModel};
pub use rol::Rol;
