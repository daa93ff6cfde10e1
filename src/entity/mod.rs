pub mod academic_records;
pub mod audit_logs;
pub mod bookings;
pub mod cafe_documents;
pub mod cafe_images;
pub mod cafe_staff;
pub mod cafes;
pub mod documents;
pub mod function_capacities;
pub mod menu_items;
pub mod order_items;
pub mod orders;
pub mod sea_orm_active_enums;
pub mod users;
pub mod work_records;

pub use academic_records::Entity as AcademicRecords;
pub use audit_logs::Entity as AuditLogs;
pub use bookings::Entity as Bookings;
pub use cafe_documents::Entity as CafeDocuments;
pub use cafe_images::Entity as CafeImages;
pub use cafe_staff::Entity as CafeStaff;
pub use cafes::Entity as Cafes;
pub use documents::Entity as Documents;
pub use function_capacities::Entity as FunctionCapacities;
pub use menu_items::Entity as MenuItems;
pub use order_items::Entity as OrderItems;
pub use orders::Entity as Orders;
pub use users::Entity as Users;
pub use work_records::Entity as WorkRecords;
