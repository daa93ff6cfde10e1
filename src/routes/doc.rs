use utoipa::{
    Modify, OpenApi,
    openapi::{
        self,
        OpenApi as OpenApiSpec,
        security::{HttpAuthScheme, HttpBuilder, SecurityScheme},
    },
};
use utoipa_scalar::{Scalar, Servable};

use crate::{
    dto::{
        admin::{
            ApprovalResponse, CafeList, CreateOwnerRequest, CreateOwnerResponse, DenyRequest,
            OwnerList, TeardownReport, UserList,
        },
        auth::{
            ChangePasswordRequest, LoginRequest, LoginResponse, PersonalDetails, RegisterRequest,
            RegisterResponse,
        },
        bookings::{BookingDecision, BookingList, CreateBookingRequest, DecideBookingRequest},
        cafe::{
            AdminCreateCafeRequest, CafeApprovalRequest, CafeDocumentList, CafeImageList,
            CafeProfileRequest, StaffCreateRequest, StaffCreated, StaffList,
        },
        catalog::{
            CapacityList, CreateMenuItemRequest, MenuItemList, UpdateMenuItemRequest,
            UpsertCapacityRequest,
        },
        orders::{CreateOrderRequest, OrderLineRequest, OrderList, OrderWithItems},
    },
    entity::sea_orm_active_enums::{ApprovalStatus, FunctionType, Role},
    models::{
        AcademicRecord, Address, Booking, Cafe, CafeDocument, CafeImage, Document,
        FunctionCapacity, MenuItem, Order, OrderItem, Owner, PublicCafe, StaffMember, User,
        UserDetail, UserWithDocuments, WorkRecord,
    },
    response::{ApiResponse, Meta},
    routes::{admin, auth, customer, health, owner, params, public},
};

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "bearer_auth",
            SecurityScheme::Http(
                HttpBuilder::new()
                    .scheme(HttpAuthScheme::Bearer)
                    .bearer_format("JWT")
                    .build(),
            ),
        );
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(
        health::health_check,
        auth::register,
        auth::login,
        auth::update_password,
        admin::list_users,
        admin::get_user,
        admin::delete_user,
        admin::approve_user,
        admin::deny_user,
        admin::download_user_document,
        admin::list_owners,
        admin::create_owner,
        admin::list_cafes,
        admin::create_cafe,
        admin::get_cafe,
        admin::delete_cafe,
        admin::set_cafe_approval,
        admin::cafe_menu,
        admin::list_cafe_documents,
        admin::download_cafe_document,
        owner::get_cafe,
        owner::upsert_cafe,
        owner::delete_cafe,
        owner::list_staff,
        owner::create_staff,
        owner::delete_staff,
        owner::list_images,
        owner::upload_image,
        owner::delete_image,
        owner::list_documents,
        owner::upload_document,
        owner::download_document,
        owner::list_menu,
        owner::create_menu_item,
        owner::update_menu_item,
        owner::delete_menu_item,
        owner::upload_menu_image,
        owner::list_capacities,
        owner::upsert_capacity,
        owner::delete_capacity,
        owner::list_bookings,
        owner::decide_booking,
        owner::list_orders,
        customer::list_my_bookings,
        customer::delete_my_booking,
        customer::list_my_orders,
        customer::create_booking,
        customer::create_order,
        public::list_cafes,
        public::get_cafe,
        public::menu,
        public::menu_image,
        public::images,
        public::image
    ),
    components(
        schemas(
            Role,
            ApprovalStatus,
            FunctionType,
            User,
            UserWithDocuments,
            UserDetail,
            Address,
            AcademicRecord,
            WorkRecord,
            Document,
            Owner,
            StaffMember,
            Cafe,
            CafeDocument,
            CafeImage,
            MenuItem,
            FunctionCapacity,
            Booking,
            Order,
            OrderItem,
            PublicCafe,
            PersonalDetails,
            RegisterRequest,
            RegisterResponse,
            LoginRequest,
            LoginResponse,
            ChangePasswordRequest,
            UserList,
            OwnerList,
            CafeList,
            DenyRequest,
            ApprovalResponse,
            CreateOwnerRequest,
            CreateOwnerResponse,
            TeardownReport,
            CafeProfileRequest,
            AdminCreateCafeRequest,
            CafeApprovalRequest,
            StaffCreateRequest,
            StaffCreated,
            StaffList,
            CafeImageList,
            CafeDocumentList,
            CreateMenuItemRequest,
            UpdateMenuItemRequest,
            MenuItemList,
            UpsertCapacityRequest,
            CapacityList,
            CreateBookingRequest,
            BookingDecision,
            DecideBookingRequest,
            BookingList,
            OrderLineRequest,
            CreateOrderRequest,
            OrderList,
            OrderWithItems,
            params::Pagination,
            Meta,
            ApiResponse<User>,
            ApiResponse<Cafe>,
            ApiResponse<Booking>,
            ApiResponse<OrderWithItems>,
            ApiResponse<TeardownReport>
        )
    ),
    security(
        ("bearer_auth" = [])
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Health", description = "Health check endpoint"),
        (name = "Auth", description = "Registration, login and password change"),
        (name = "Admin", description = "User approval, owners and cafe oversight"),
        (name = "Owner", description = "Cafe profile, staff, media, catalog, bookings and orders"),
        (name = "Customer", description = "Bookings and orders placed by customers"),
        (name = "Public", description = "Approved and active cafes"),
    )
)]
pub struct ApiDoc;

pub fn scalar_docs() -> Scalar<OpenApiSpec> {
    Scalar::with_url("/docs", ApiDoc::openapi())
}
