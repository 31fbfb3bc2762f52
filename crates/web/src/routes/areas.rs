//! Role area pages.
//!
//! Each page only renders for roles admitted to its area; everyone else is
//! sent to login or to their own landing route by [`RequireArea`].

use askama::Template;
use askama_web::WebTemplate;
use axum::response::IntoResponse;
use detailer_core::{SessionUser, TenantIdentity};

use crate::middleware::{AdminArea, BookingArea, RequireArea, StaffArea};
use crate::tenant::CurrentTenant;

/// Data shared by the area page templates.
pub struct AreaPage {
    pub tenant_name: Option<String>,
    pub user_name: String,
    pub role: String,
}

impl AreaPage {
    fn new(tenant: &TenantIdentity, user: &SessionUser) -> Self {
        Self {
            tenant_name: tenant.tenant_name().map(str::to_owned),
            user_name: user.name.clone(),
            role: user.role.to_string(),
        }
    }
}

/// Admin dashboard template.
#[derive(Template, WebTemplate)]
#[template(path = "areas/admin.html")]
pub struct AdminDashboardTemplate {
    pub page: AreaPage,
}

/// Staff dashboard template.
#[derive(Template, WebTemplate)]
#[template(path = "areas/staff.html")]
pub struct StaffDashboardTemplate {
    pub page: AreaPage,
}

/// Booking services template.
#[derive(Template, WebTemplate)]
#[template(path = "areas/booking.html")]
pub struct BookingServicesTemplate {
    pub page: AreaPage,
}

/// Display the admin dashboard.
pub async fn admin_dashboard(
    CurrentTenant(tenant): CurrentTenant,
    RequireArea(user, _): RequireArea<AdminArea>,
) -> impl IntoResponse {
    AdminDashboardTemplate {
        page: AreaPage::new(&tenant, &user),
    }
}

/// Display the staff dashboard.
pub async fn staff_dashboard(
    CurrentTenant(tenant): CurrentTenant,
    RequireArea(user, _): RequireArea<StaffArea>,
) -> impl IntoResponse {
    StaffDashboardTemplate {
        page: AreaPage::new(&tenant, &user),
    }
}

/// Display the booking services page.
pub async fn booking_services(
    CurrentTenant(tenant): CurrentTenant,
    RequireArea(user, _): RequireArea<BookingArea>,
) -> impl IntoResponse {
    BookingServicesTemplate {
        page: AreaPage::new(&tenant, &user),
    }
}
