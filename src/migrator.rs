use sea_orm_migration::prelude::*;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20250101_000001_create_students_table::Migration),
            Box::new(m20250101_000002_create_teachers_table::Migration),
            Box::new(m20250101_000003_create_class_offerings_table::Migration),
            Box::new(m20250101_000004_create_enrollments_table::Migration),
            Box::new(m20250101_000005_create_tuition_charges_table::Migration),
            Box::new(m20250101_000006_create_book_suppliers_table::Migration),
            Box::new(m20250101_000007_create_books_table::Migration),
            Box::new(m20250101_000008_create_book_stock_entries_table::Migration),
            Box::new(m20250101_000009_create_book_sales_table::Migration),
            Box::new(m20250101_000010_create_teacher_work_records_table::Migration),
            Box::new(m20250101_000011_create_teacher_payment_records_table::Migration),
            Box::new(m20250101_000012_create_teacher_unavailable_days_table::Migration),
        ]
    }
}

mod m20250101_000001_create_students_table {
    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20250101_000001_create_students_table"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(Students::Table)
                        .if_not_exists()
                        .col(ColumnDef::new(Students::Id).uuid().primary_key().not_null())
                        .col(
                            ColumnDef::new(Students::StudentNumber)
                                .big_integer()
                                .not_null(),
                        )
                        .col(ColumnDef::new(Students::Name).string().not_null())
                        .col(ColumnDef::new(Students::School).string().null())
                        .col(ColumnDef::new(Students::Grade).string().not_null())
                        .col(ColumnDef::new(Students::Gender).string().not_null())
                        .col(ColumnDef::new(Students::StudentPhone).string().null())
                        .col(ColumnDef::new(Students::ParentPhone).string().null())
                        .col(ColumnDef::new(Students::Email).string().null())
                        .col(ColumnDef::new(Students::FirstClassDate).date().null())
                        .col(ColumnDef::new(Students::LastClassDate).date().null())
                        .col(ColumnDef::new(Students::Memo).string().null())
                        .col(ColumnDef::new(Students::Status).string().not_null())
                        .col(
                            ColumnDef::new(Students::UnpaidAmount)
                                .big_integer()
                                .not_null()
                                .default(0),
                        )
                        .col(ColumnDef::new(Students::CreatedAt).timestamp().not_null())
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .name("idx_students_student_number")
                        .table(Students::Table)
                        .col(Students::StudentNumber)
                        .unique()
                        .to_owned(),
                )
                .await?;

            Ok(())
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(Students::Table).to_owned())
                .await
        }
    }

    #[derive(Iden)]
    enum Students {
        Table,
        Id,
        StudentNumber,
        Name,
        School,
        Grade,
        Gender,
        StudentPhone,
        ParentPhone,
        Email,
        FirstClassDate,
        LastClassDate,
        Memo,
        Status,
        UnpaidAmount,
        CreatedAt,
    }
}

mod m20250101_000002_create_teachers_table {
    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20250101_000002_create_teachers_table"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(Teachers::Table)
                        .if_not_exists()
                        .col(ColumnDef::new(Teachers::Id).uuid().primary_key().not_null())
                        .col(ColumnDef::new(Teachers::Name).string().not_null())
                        .col(ColumnDef::new(Teachers::Gender).string().not_null())
                        .col(ColumnDef::new(Teachers::Phone).string().not_null())
                        .col(ColumnDef::new(Teachers::Email).string().null())
                        .col(ColumnDef::new(Teachers::Status).string().not_null())
                        .col(ColumnDef::new(Teachers::HireDate).date().not_null())
                        .col(ColumnDef::new(Teachers::ResignDate).date().null())
                        .col(
                            ColumnDef::new(Teachers::BasePay)
                                .big_integer()
                                .not_null()
                                .default(0),
                        )
                        .col(
                            ColumnDef::new(Teachers::ExtraPay)
                                .big_integer()
                                .not_null()
                                .default(0),
                        )
                        .col(ColumnDef::new(Teachers::BankName).string().not_null())
                        .col(ColumnDef::new(Teachers::AccountNumber).string().not_null())
                        .col(ColumnDef::new(Teachers::CreatedAt).timestamp().not_null())
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(Teachers::Table).to_owned())
                .await
        }
    }

    #[derive(Iden)]
    enum Teachers {
        Table,
        Id,
        Name,
        Gender,
        Phone,
        Email,
        Status,
        HireDate,
        ResignDate,
        BasePay,
        ExtraPay,
        BankName,
        AccountNumber,
        CreatedAt,
    }
}

mod m20250101_000003_create_class_offerings_table {
    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20250101_000003_create_class_offerings_table"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(ClassOfferings::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(ClassOfferings::Id)
                                .uuid()
                                .primary_key()
                                .not_null(),
                        )
                        .col(ColumnDef::new(ClassOfferings::Name).string().not_null())
                        .col(ColumnDef::new(ClassOfferings::TeacherId).uuid().null())
                        .col(
                            ColumnDef::new(ClassOfferings::MonthlyFee)
                                .big_integer()
                                .not_null()
                                .default(0),
                        )
                        .col(ColumnDef::new(ClassOfferings::Schedule).string().null())
                        .col(ColumnDef::new(ClassOfferings::StartDate).date().null())
                        .col(ColumnDef::new(ClassOfferings::EndDate).date().null())
                        .col(
                            ColumnDef::new(ClassOfferings::IsActive)
                                .boolean()
                                .not_null()
                                .default(true),
                        )
                        .col(
                            ColumnDef::new(ClassOfferings::CreatedAt)
                                .timestamp()
                                .not_null(),
                        )
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(ClassOfferings::Table).to_owned())
                .await
        }
    }

    #[derive(Iden)]
    enum ClassOfferings {
        Table,
        Id,
        Name,
        TeacherId,
        MonthlyFee,
        Schedule,
        StartDate,
        EndDate,
        IsActive,
        CreatedAt,
    }
}

mod m20250101_000004_create_enrollments_table {
    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20250101_000004_create_enrollments_table"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(Enrollments::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(Enrollments::Id)
                                .uuid()
                                .primary_key()
                                .not_null(),
                        )
                        .col(ColumnDef::new(Enrollments::StudentId).uuid().not_null())
                        .col(ColumnDef::new(Enrollments::ClassId).uuid().not_null())
                        .col(
                            ColumnDef::new(Enrollments::CreatedAt)
                                .timestamp()
                                .not_null(),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .name("idx_enrollments_student_class")
                        .table(Enrollments::Table)
                        .col(Enrollments::StudentId)
                        .col(Enrollments::ClassId)
                        .unique()
                        .to_owned(),
                )
                .await?;

            Ok(())
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(Enrollments::Table).to_owned())
                .await
        }
    }

    #[derive(Iden)]
    enum Enrollments {
        Table,
        Id,
        StudentId,
        ClassId,
        CreatedAt,
    }
}

mod m20250101_000005_create_tuition_charges_table {
    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20250101_000005_create_tuition_charges_table"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(TuitionCharges::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(TuitionCharges::Id)
                                .uuid()
                                .primary_key()
                                .not_null(),
                        )
                        .col(ColumnDef::new(TuitionCharges::StudentId).uuid().not_null())
                        .col(ColumnDef::new(TuitionCharges::ClassId).uuid().not_null())
                        .col(
                            ColumnDef::new(TuitionCharges::ChargeDate)
                                .date()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(TuitionCharges::Amount)
                                .big_integer()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(TuitionCharges::BillingMonth)
                                .string()
                                .not_null(),
                        )
                        .col(ColumnDef::new(TuitionCharges::Memo).string().null())
                        .col(
                            ColumnDef::new(TuitionCharges::IsPaid)
                                .boolean()
                                .not_null()
                                .default(false),
                        )
                        .col(ColumnDef::new(TuitionCharges::PaymentDate).date().null())
                        .col(
                            ColumnDef::new(TuitionCharges::CreatedAt)
                                .timestamp()
                                .not_null(),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .name("idx_tuition_charges_student")
                        .table(TuitionCharges::Table)
                        .col(TuitionCharges::StudentId)
                        .to_owned(),
                )
                .await?;

            Ok(())
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(TuitionCharges::Table).to_owned())
                .await
        }
    }

    #[derive(Iden)]
    enum TuitionCharges {
        Table,
        Id,
        StudentId,
        ClassId,
        ChargeDate,
        Amount,
        BillingMonth,
        Memo,
        IsPaid,
        PaymentDate,
        CreatedAt,
    }
}

mod m20250101_000006_create_book_suppliers_table {
    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20250101_000006_create_book_suppliers_table"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(BookSuppliers::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(BookSuppliers::Id)
                                .uuid()
                                .primary_key()
                                .not_null(),
                        )
                        .col(ColumnDef::new(BookSuppliers::Name).string().not_null())
                        .col(
                            ColumnDef::new(BookSuppliers::RegistrationNumber)
                                .string()
                                .null(),
                        )
                        .col(ColumnDef::new(BookSuppliers::Phone).string().null())
                        .col(ColumnDef::new(BookSuppliers::Address).string().null())
                        .col(ColumnDef::new(BookSuppliers::BankName).string().null())
                        .col(ColumnDef::new(BookSuppliers::AccountNumber).string().null())
                        .col(ColumnDef::new(BookSuppliers::AccountOwner).string().null())
                        .col(
                            ColumnDef::new(BookSuppliers::CreatedAt)
                                .timestamp()
                                .not_null(),
                        )
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(BookSuppliers::Table).to_owned())
                .await
        }
    }

    #[derive(Iden)]
    enum BookSuppliers {
        Table,
        Id,
        Name,
        RegistrationNumber,
        Phone,
        Address,
        BankName,
        AccountNumber,
        AccountOwner,
        CreatedAt,
    }
}

mod m20250101_000007_create_books_table {
    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20250101_000007_create_books_table"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(Books::Table)
                        .if_not_exists()
                        .col(ColumnDef::new(Books::Id).uuid().primary_key().not_null())
                        .col(ColumnDef::new(Books::Title).string().not_null())
                        .col(ColumnDef::new(Books::Isbn).string().not_null())
                        .col(ColumnDef::new(Books::Author).string().null())
                        .col(ColumnDef::new(Books::Publisher).string().null())
                        .col(ColumnDef::new(Books::SupplierId).uuid().null())
                        .col(
                            ColumnDef::new(Books::ListPrice)
                                .big_integer()
                                .not_null()
                                .default(0),
                        )
                        .col(
                            ColumnDef::new(Books::CostPrice)
                                .big_integer()
                                .not_null()
                                .default(0),
                        )
                        .col(
                            ColumnDef::new(Books::SalePrice)
                                .big_integer()
                                .not_null()
                                .default(0),
                        )
                        .col(
                            ColumnDef::new(Books::Stock)
                                .integer()
                                .not_null()
                                .default(0),
                        )
                        .col(ColumnDef::new(Books::Memo).string().null())
                        .col(ColumnDef::new(Books::CreatedAt).timestamp().not_null())
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .name("idx_books_isbn")
                        .table(Books::Table)
                        .col(Books::Isbn)
                        .unique()
                        .to_owned(),
                )
                .await?;

            Ok(())
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(Books::Table).to_owned())
                .await
        }
    }

    #[derive(Iden)]
    enum Books {
        Table,
        Id,
        Title,
        Isbn,
        Author,
        Publisher,
        SupplierId,
        ListPrice,
        CostPrice,
        SalePrice,
        Stock,
        Memo,
        CreatedAt,
    }
}

mod m20250101_000008_create_book_stock_entries_table {
    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20250101_000008_create_book_stock_entries_table"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(BookStockEntries::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(BookStockEntries::Id)
                                .uuid()
                                .primary_key()
                                .not_null(),
                        )
                        .col(ColumnDef::new(BookStockEntries::BookId).uuid().not_null())
                        .col(ColumnDef::new(BookStockEntries::SupplierId).uuid().null())
                        .col(
                            ColumnDef::new(BookStockEntries::Quantity)
                                .integer()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(BookStockEntries::UnitCost)
                                .big_integer()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(BookStockEntries::TotalPayment)
                                .big_integer()
                                .not_null()
                                .default(0),
                        )
                        .col(
                            ColumnDef::new(BookStockEntries::IsPaid)
                                .boolean()
                                .not_null()
                                .default(false),
                        )
                        .col(
                            ColumnDef::new(BookStockEntries::PaymentDate)
                                .date()
                                .null(),
                        )
                        .col(ColumnDef::new(BookStockEntries::Memo).string().null())
                        .col(
                            ColumnDef::new(BookStockEntries::CreatedAt)
                                .timestamp()
                                .not_null(),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .name("idx_book_stock_entries_book")
                        .table(BookStockEntries::Table)
                        .col(BookStockEntries::BookId)
                        .to_owned(),
                )
                .await?;

            Ok(())
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(BookStockEntries::Table).to_owned())
                .await
        }
    }

    #[derive(Iden)]
    enum BookStockEntries {
        Table,
        Id,
        BookId,
        SupplierId,
        Quantity,
        UnitCost,
        TotalPayment,
        IsPaid,
        PaymentDate,
        Memo,
        CreatedAt,
    }
}

mod m20250101_000009_create_book_sales_table {
    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20250101_000009_create_book_sales_table"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(BookSales::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(BookSales::Id)
                                .uuid()
                                .primary_key()
                                .not_null(),
                        )
                        .col(ColumnDef::new(BookSales::StudentId).uuid().not_null())
                        .col(ColumnDef::new(BookSales::BookId).uuid().not_null())
                        .col(ColumnDef::new(BookSales::SaleDate).date().not_null())
                        .col(
                            ColumnDef::new(BookSales::UnitPrice)
                                .big_integer()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(BookSales::Quantity)
                                .integer()
                                .not_null()
                                .default(1),
                        )
                        .col(
                            ColumnDef::new(BookSales::IsPaid)
                                .boolean()
                                .not_null()
                                .default(false),
                        )
                        .col(ColumnDef::new(BookSales::PaymentDate).date().null())
                        .col(ColumnDef::new(BookSales::Memo).string().null())
                        .col(ColumnDef::new(BookSales::CreatedAt).timestamp().not_null())
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .name("idx_book_sales_student")
                        .table(BookSales::Table)
                        .col(BookSales::StudentId)
                        .to_owned(),
                )
                .await?;

            Ok(())
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(BookSales::Table).to_owned())
                .await
        }
    }

    #[derive(Iden)]
    enum BookSales {
        Table,
        Id,
        StudentId,
        BookId,
        SaleDate,
        UnitPrice,
        Quantity,
        IsPaid,
        PaymentDate,
        Memo,
        CreatedAt,
    }
}

mod m20250101_000010_create_teacher_work_records_table {
    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20250101_000010_create_teacher_work_records_table"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(TeacherWorkRecords::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(TeacherWorkRecords::Id)
                                .uuid()
                                .primary_key()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(TeacherWorkRecords::TeacherId)
                                .uuid()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(TeacherWorkRecords::WorkDate)
                                .date()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(TeacherWorkRecords::StartTime)
                                .time()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(TeacherWorkRecords::EndTime)
                                .time()
                                .not_null(),
                        )
                        .col(ColumnDef::new(TeacherWorkRecords::Memo).string().null())
                        .col(
                            ColumnDef::new(TeacherWorkRecords::CreatedAt)
                                .timestamp()
                                .not_null(),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .name("idx_teacher_work_records_teacher_date")
                        .table(TeacherWorkRecords::Table)
                        .col(TeacherWorkRecords::TeacherId)
                        .col(TeacherWorkRecords::WorkDate)
                        .to_owned(),
                )
                .await?;

            Ok(())
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(TeacherWorkRecords::Table).to_owned())
                .await
        }
    }

    #[derive(Iden)]
    enum TeacherWorkRecords {
        Table,
        Id,
        TeacherId,
        WorkDate,
        StartTime,
        EndTime,
        Memo,
        CreatedAt,
    }
}

mod m20250101_000011_create_teacher_payment_records_table {
    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20250101_000011_create_teacher_payment_records_table"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(TeacherPaymentRecords::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(TeacherPaymentRecords::Id)
                                .uuid()
                                .primary_key()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(TeacherPaymentRecords::TeacherId)
                                .uuid()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(TeacherPaymentRecords::Year)
                                .integer()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(TeacherPaymentRecords::Month)
                                .integer()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(TeacherPaymentRecords::AmountPaid)
                                .big_integer()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(TeacherPaymentRecords::PaymentDate)
                                .date()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(TeacherPaymentRecords::IsPaid)
                                .boolean()
                                .not_null()
                                .default(true),
                        )
                        .to_owned(),
                )
                .await?;

            // One settlement snapshot per teacher per calendar month.
            manager
                .create_index(
                    Index::create()
                        .name("idx_teacher_payment_records_key")
                        .table(TeacherPaymentRecords::Table)
                        .col(TeacherPaymentRecords::TeacherId)
                        .col(TeacherPaymentRecords::Year)
                        .col(TeacherPaymentRecords::Month)
                        .unique()
                        .to_owned(),
                )
                .await?;

            Ok(())
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(TeacherPaymentRecords::Table).to_owned())
                .await
        }
    }

    #[derive(Iden)]
    enum TeacherPaymentRecords {
        Table,
        Id,
        TeacherId,
        Year,
        Month,
        AmountPaid,
        PaymentDate,
        IsPaid,
    }
}

mod m20250101_000012_create_teacher_unavailable_days_table {
    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20250101_000012_create_teacher_unavailable_days_table"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(TeacherUnavailableDays::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(TeacherUnavailableDays::Id)
                                .uuid()
                                .primary_key()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(TeacherUnavailableDays::TeacherId)
                                .uuid()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(TeacherUnavailableDays::Date)
                                .date()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(TeacherUnavailableDays::Reason)
                                .string()
                                .null(),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .name("idx_teacher_unavailable_days_date")
                        .table(TeacherUnavailableDays::Table)
                        .col(TeacherUnavailableDays::Date)
                        .to_owned(),
                )
                .await?;

            Ok(())
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(
                    Table::drop()
                        .table(TeacherUnavailableDays::Table)
                        .to_owned(),
                )
                .await
        }
    }

    #[derive(Iden)]
    enum TeacherUnavailableDays {
        Table,
        Id,
        TeacherId,
        Date,
        Reason,
    }
}
