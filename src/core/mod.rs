/// Staff login and session payloads
pub mod auth;
/// Category CRUD, name uniqueness and delete guard
pub mod categoria;
/// Loyalty customers: registration, customer codes and login
pub mod cliente;
/// Staff CRUD shared by the employee and registration surfaces
pub mod colaborador;
/// RFC/CURP encryption and blind index
pub mod crypto;
/// Supply CRUD and category-joined reads
pub mod insumo;
/// bcrypt password hashing
pub mod password;
/// Signed, expiring session tokens
pub mod token;
/// Field validation rules shared by every entity
pub mod validation;
