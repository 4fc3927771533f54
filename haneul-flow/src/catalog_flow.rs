//! Session-gated package catalog.
//!
//! Mounting checks the session flag once. Without it the page shows nothing,
//! tells the user to log in and redirects to the auth page after the configured
//! delay. With it the page lists the catalog, filters it as the user types and
//! lets them open a package and request a booking.

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::{
    catalog::{PackageCard, TravelPackage, ensure_unique_ids, filter_packages},
    context::AppContext,
    error::{FlowError, Result},
    navigation::Destination,
    notify::Notification,
    redirect::ScheduledRedirect,
};

pub const LOGIN_REQUIRED_TITLE: &str = "Acesso restrito";
pub const LOGIN_REQUIRED_MESSAGE: &str = "Você precisa estar logado para ver os pacotes.";
pub const SIGNED_OUT_MESSAGE: &str = "Você saiu da sua conta.";
pub const BOOKING_REQUESTED_TITLE: &str = "Agendamento solicitado!";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CatalogPhase {
    /// Session flag not read yet
    Checking,
    /// Flag present; catalog visible
    Authenticated,
    /// Flag missing; waiting for the redirect to the auth page
    Redirecting,
    /// User signed out from this page
    SignedOut,
}

pub struct CatalogPage {
    ctx: AppContext,
    phase: CatalogPhase,
    packages: Vec<TravelPackage>,
    search: String,
    selected: Option<u32>,
    redirect: Option<ScheduledRedirect>,
}

impl CatalogPage {
    pub fn new(ctx: AppContext) -> Self {
        Self {
            ctx,
            phase: CatalogPhase::Checking,
            packages: Vec::new(),
            search: String::new(),
            selected: None,
            redirect: None,
        }
    }

    /// Build the page and run the session check.
    pub async fn mount(ctx: AppContext) -> Result<Self> {
        let mut page = Self::new(ctx);
        page.check_session().await?;
        Ok(page)
    }

    pub async fn check_session(&mut self) -> Result<()> {
        if self.phase != CatalogPhase::Checking {
            return Ok(());
        }

        if self.ctx.session.is_authenticated().await? {
            let packages = self.ctx.catalog.list_packages().await?;
            ensure_unique_ids(&packages)?;
            self.packages = packages;
            self.phase = CatalogPhase::Authenticated;
            info!(packages = self.packages.len(), "Catalog ready");
        } else {
            warn!(key = %self.ctx.session.key(), "Session flag missing, redirecting to login");
            self.ctx.notify(
                Notification::error(LOGIN_REQUIRED_TITLE).with_description(LOGIN_REQUIRED_MESSAGE),
            );
            self.redirect = Some(ScheduledRedirect::schedule(
                self.ctx.navigator.clone(),
                Destination::Auth,
                self.ctx.config.redirect_delay,
            ));
            self.phase = CatalogPhase::Redirecting;
        }
        Ok(())
    }

    pub fn phase(&self) -> CatalogPhase {
        self.phase
    }

    pub fn search(&self) -> &str {
        &self.search
    }

    pub fn set_search(&mut self, text: impl Into<String>) {
        self.search = text.into();
    }

    /// Packages matching the current search. Empty unless authenticated.
    pub fn visible_packages(&self) -> Vec<&TravelPackage> {
        if self.phase != CatalogPhase::Authenticated {
            return Vec::new();
        }
        filter_packages(&self.packages, &self.search)
    }

    pub fn cards(&self) -> Vec<PackageCard> {
        self.visible_packages()
            .into_iter()
            .map(PackageCard::from)
            .collect()
    }

    /// Card click. Re-reads the session flag and only opens the detail view if
    /// it is still set. Returns whether the view opened.
    pub async fn open_package(&mut self, id: u32) -> Result<bool> {
        if self.phase != CatalogPhase::Authenticated {
            return Err(FlowError::NotAuthenticated);
        }
        if !self.ctx.session.is_authenticated().await? {
            warn!(package_id = id, "Session flag gone, not opening package");
            self.ctx.notify(
                Notification::error(LOGIN_REQUIRED_TITLE).with_description(LOGIN_REQUIRED_MESSAGE),
            );
            return Ok(false);
        }
        if !self.packages.iter().any(|p| p.id == id) {
            return Err(FlowError::PackageNotFound(id));
        }
        self.selected = Some(id);
        info!(package_id = id, "Package opened");
        Ok(true)
    }

    pub fn selected(&self) -> Option<&TravelPackage> {
        self.selected
            .and_then(|id| self.packages.iter().find(|p| p.id == id))
    }

    /// Close the detail view without booking.
    pub fn dismiss(&mut self) {
        self.selected = None;
    }

    /// "Solicitar Agendamento". Notifies and closes the detail view; the catalog
    /// and its slot counts are left as they are.
    pub fn request_booking(&mut self) -> Result<Notification> {
        let package = self.selected().ok_or(FlowError::NothingSelected)?;
        info!(package_id = package.id, title = %package.title, "Booking requested");

        let notification = Notification::success(BOOKING_REQUESTED_TITLE).with_description(
            format!(
                "Recebemos sua solicitação para {}. Entraremos em contato em breve.",
                package.title
            ),
        );
        self.ctx.notify(notification.clone());
        self.selected = None;
        Ok(notification)
    }

    /// Only available while the catalog is showing.
    pub async fn sign_out(&mut self) -> Result<()> {
        if self.phase != CatalogPhase::Authenticated {
            return Err(FlowError::NotAuthenticated);
        }
        self.ctx.session.clear().await?;
        self.selected = None;
        self.phase = CatalogPhase::SignedOut;
        info!("User signed out");
        self.ctx.notify(Notification::neutral(SIGNED_OUT_MESSAGE));
        self.ctx.navigate(Destination::Auth);
        Ok(())
    }

    /// Hand the pending redirect to the host, e.g. to wait for it.
    pub fn take_redirect(&mut self) -> Option<ScheduledRedirect> {
        self.redirect.take()
    }

    /// Tear the page down. A pending redirect is cancelled.
    pub fn unmount(mut self) {
        if let Some(mut redirect) = self.redirect.take() {
            redirect.cancel();
        }
        info!(phase = ?self.phase, "Catalog page unmounted");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        catalog::StaticCatalog,
        navigation::NavigationLog,
        notify::{NotificationLog, Severity},
    };
    use std::sync::Arc;
    use std::time::Duration;

    struct Harness {
        ctx: AppContext,
        notes: NotificationLog,
        nav: NavigationLog,
    }

    fn harness() -> Harness {
        let notes = NotificationLog::new();
        let nav = NavigationLog::new();
        let ctx = AppContext::in_memory(Arc::new(notes.clone()), Arc::new(nav.clone()));
        Harness { ctx, notes, nav }
    }

    async fn signed_in() -> (CatalogPage, Harness) {
        let h = harness();
        h.ctx.session.establish().await.unwrap();
        let page = CatalogPage::mount(h.ctx.clone()).await.unwrap();
        (page, h)
    }

    #[tokio::test(start_paused = true)]
    async fn missing_flag_never_shows_catalog_and_redirects() {
        let h = harness();
        let mut page = CatalogPage::mount(h.ctx.clone()).await.unwrap();

        assert_eq!(page.phase(), CatalogPhase::Redirecting);
        assert!(page.cards().is_empty());
        page.set_search("");
        assert!(page.visible_packages().is_empty());

        let note = h.notes.last().unwrap();
        assert_eq!(note.severity, Severity::Error);
        assert_eq!(note.description.as_deref(), Some(LOGIN_REQUIRED_MESSAGE));
        assert!(h.nav.history().is_empty());

        tokio::time::sleep(h.ctx.config.redirect_delay + Duration::from_millis(10)).await;
        assert_eq!(h.nav.history(), vec![Destination::Auth]);
        drop(page);
    }

    #[tokio::test(start_paused = true)]
    async fn unmount_before_delay_cancels_redirect() {
        let h = harness();
        let page = CatalogPage::mount(h.ctx.clone()).await.unwrap();

        tokio::time::sleep(Duration::from_millis(100)).await;
        page.unmount();
        tokio::time::sleep(h.ctx.config.redirect_delay * 2).await;

        assert!(h.nav.history().is_empty());
    }

    #[tokio::test]
    async fn search_narrows_the_cards() {
        let (mut page, _h) = signed_in().await;
        assert_eq!(page.phase(), CatalogPhase::Authenticated);
        assert_eq!(page.cards().len(), 3);

        page.set_search("busan");
        let titles: Vec<String> = page.cards().into_iter().map(|c| c.title).collect();
        assert_eq!(titles, vec!["Coreia do Sul - Busan"]);

        page.set_search("Coreia");
        assert_eq!(page.cards().len(), 3);

        page.set_search("xyz");
        assert!(page.cards().is_empty());
    }

    #[tokio::test]
    async fn booking_clears_selection_and_keeps_slots() {
        let (mut page, h) = signed_in().await;
        let before: Vec<TravelPackage> = page.visible_packages().into_iter().cloned().collect();

        assert!(page.open_package(2).await.unwrap());
        assert_eq!(page.selected().map(|p| p.id), Some(2));

        let note = page.request_booking().unwrap();
        assert_eq!(note.severity, Severity::Success);
        assert!(note.description.unwrap().contains("Coreia do Sul - Busan"));
        assert!(page.selected().is_none());

        let after: Vec<TravelPackage> = page.visible_packages().into_iter().cloned().collect();
        assert_eq!(before, after);
        assert_eq!(h.notes.last().unwrap().title, BOOKING_REQUESTED_TITLE);
    }

    #[tokio::test]
    async fn booking_needs_a_selection() {
        let (mut page, h) = signed_in().await;
        assert!(matches!(page.request_booking(), Err(FlowError::NothingSelected)));
        assert!(h.notes.is_empty());
    }

    #[tokio::test]
    async fn dismiss_closes_the_detail_view() {
        let (mut page, _h) = signed_in().await;
        page.open_package(1).await.unwrap();
        page.dismiss();
        assert!(page.selected().is_none());
    }

    #[tokio::test]
    async fn unknown_package_is_rejected() {
        let (mut page, _h) = signed_in().await;
        assert!(matches!(
            page.open_package(42).await,
            Err(FlowError::PackageNotFound(42))
        ));
        assert!(page.selected().is_none());
    }

    #[tokio::test]
    async fn card_click_rechecks_the_flag() {
        let (mut page, h) = signed_in().await;
        h.ctx.session.clear().await.unwrap();

        assert!(!page.open_package(1).await.unwrap());
        assert!(page.selected().is_none());
        assert_eq!(h.notes.last().unwrap().title, LOGIN_REQUIRED_TITLE);
    }

    #[tokio::test]
    async fn card_badges_reflect_remaining_slots() {
        let (mut page, _h) = signed_in().await;
        let jeju = page.cards().into_iter().find(|c| c.id == 3).unwrap();
        assert!(!jeju.view_enabled);
        assert_eq!(jeju.badge, "Esgotado");

        let busan = page.cards().into_iter().find(|c| c.id == 2).unwrap();
        assert_eq!(busan.badge, "1 vaga");
    }

    #[tokio::test]
    async fn sign_out_clears_flag_and_leaves() {
        let (mut page, h) = signed_in().await;
        page.open_package(1).await.unwrap();

        page.sign_out().await.unwrap();

        assert_eq!(page.phase(), CatalogPhase::SignedOut);
        assert!(page.selected().is_none());
        assert!(!h.ctx.session.is_authenticated().await.unwrap());
        assert_eq!(h.nav.current(), Some(Destination::Auth));
        assert_eq!(h.notes.last().unwrap().title, SIGNED_OUT_MESSAGE);
    }

    #[tokio::test(start_paused = true)]
    async fn sign_out_while_redirecting_is_refused() {
        let h = harness();
        let mut page = CatalogPage::mount(h.ctx.clone()).await.unwrap();

        assert!(matches!(page.sign_out().await, Err(FlowError::NotAuthenticated)));
        assert_eq!(page.phase(), CatalogPhase::Redirecting);
        assert_eq!(h.notes.len(), 1);

        tokio::time::sleep(h.ctx.config.redirect_delay * 2).await;
        assert_eq!(h.nav.history(), vec![Destination::Auth]);
        drop(page);
    }

    #[tokio::test]
    async fn corrupt_session_file_redirects_and_sign_in_recovers() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("session.json");
        std::fs::write(&path, r#"{"haneul_user": "abc"#).unwrap();

        let notes = NotificationLog::new();
        let nav = NavigationLog::new();
        let ctx = AppContext::new(
            crate::config::FlowConfig::default(),
            Arc::new(crate::storage::FileSessionStorage::new(&path)),
            Arc::new(notes.clone()),
            Arc::new(nav.clone()),
        );

        let page = CatalogPage::mount(ctx.clone()).await.unwrap();
        assert_eq!(page.phase(), CatalogPhase::Redirecting);
        assert_eq!(notes.last().unwrap().title, LOGIN_REQUIRED_TITLE);
        page.unmount();

        let mut auth = crate::auth::AuthPage::new(ctx.clone());
        auth.dispatch(crate::auth::AuthAction::SetLoginPhone("(11) 99999-9999".into()));
        auth.dispatch(crate::auth::AuthAction::SetLoginPassword("senha".into()));
        assert!(auth.submit().await.unwrap().is_accepted());

        let page = CatalogPage::mount(ctx).await.unwrap();
        assert_eq!(page.phase(), CatalogPhase::Authenticated);
    }

    #[tokio::test]
    async fn duplicate_ids_from_any_repository_are_rejected() {
        struct Doubled;

        #[async_trait::async_trait]
        impl crate::catalog::PackageRepository for Doubled {
            async fn list_packages(&self) -> Result<Vec<TravelPackage>> {
                let mut packages = StaticCatalog::packages();
                packages[1].id = 1;
                Ok(packages)
            }
        }

        let h = harness();
        h.ctx.session.establish().await.unwrap();
        let ctx = h.ctx.clone().with_catalog(Arc::new(Doubled));
        assert!(matches!(
            CatalogPage::mount(ctx).await,
            Err(FlowError::DuplicatePackage(1))
        ));
    }

    #[tokio::test]
    async fn catalog_comes_from_the_repository() {
        struct OnePackage;

        #[async_trait::async_trait]
        impl crate::catalog::PackageRepository for OnePackage {
            async fn list_packages(&self) -> Result<Vec<TravelPackage>> {
                Ok(StaticCatalog::packages().into_iter().take(1).collect())
            }
        }

        let h = harness();
        h.ctx.session.establish().await.unwrap();
        let ctx = h.ctx.clone().with_catalog(Arc::new(OnePackage));
        let page = CatalogPage::mount(ctx).await.unwrap();
        assert_eq!(page.cards().len(), 1);
    }
}
