pub mod book;
pub mod book_sale;
pub mod book_stock_entry;
pub mod book_supplier;
pub mod class_offering;
pub mod enrollment;
pub mod payment_record;
pub mod student;
pub mod teacher;
pub mod tuition_charge;
pub mod unavailable_day;
pub mod work_record;
