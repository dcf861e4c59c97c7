//! The plan-selection and single-shot payment flow, independent of any
//! rendering.
//!
//! A [`PaymentSession`] owns the selected plan, the status line and the
//! single-flight guard of one widget. Activating it ([`PaymentSession::activate`])
//! is synchronous so the guard is taken before any await point; the returned
//! [`Attempt`] then fetches the transaction, publishes the vendor handoff and
//! schedules the deferred re-activation of the trigger element.
//!
//! The deferred re-activation reaches the widget's own click handler too. It
//! is recognised as the vendor's activation and ignored, otherwise every
//! handoff would start a new attempt.

use std::cell::{Cell, RefCell};
use std::rc::{Rc, Weak};

use tracing::{debug, error, info, warn};
use yew::Callback;

use crate::catalog::PlanKey;
use crate::error::PayboxError;
use crate::handoff::{PayboxData, PayboxHost};
use crate::settings::PayboxSettings;
use crate::status::{error_message, AuthorizeResponse};
use crate::transaction::TransactionApi;

/// Listeners notified by a session.
#[derive(Clone, Default, PartialEq)]
pub struct SessionCallbacks {
    /// New status line, `None` when it is cleared.
    pub on_status: Callback<Option<String>>,
    /// Raw response of the vendor for each authorization.
    pub on_authorize: Callback<AuthorizeResponse>,
}

/// Result of activating the pay button.
pub enum Activation<A, H> {
    /// The click was the widget's own deferred re-activation.
    Vendor,
    /// An attempt is already in flight.
    Busy,
    /// A new attempt was started; run it to completion.
    Started(Attempt<A, H>),
}

/// How an attempt ended from the widget's point of view.
#[derive(Debug, Clone, PartialEq)]
pub enum PayOutcome {
    /// Another attempt was in flight.
    Ignored,
    /// The activation was the widget's own hand-over to the vendor.
    Vendor,
    /// Preparing the transaction failed; the guard is released.
    Failed(PayboxError),
    /// Everything was published but the trigger element is missing.
    TriggerMissing,
    /// The vendor handoff is published and the re-activation scheduled.
    HandedOff { transaction_id: String },
}

struct Inner<A, H> {
    api: A,
    host: H,
    settings: PayboxSettings,
    callbacks: SessionCallbacks,
    plan: Cell<PlanKey>,
    in_flight: Cell<bool>,
    vendor_activation: Cell<bool>,
    status: RefCell<Option<String>>,
}

/// Shared handle to one widget's payment state.
pub struct PaymentSession<A, H> {
    inner: Rc<Inner<A, H>>,
}

impl<A, H> Clone for PaymentSession<A, H> {
    fn clone(&self) -> Self {
        Self {
            inner: Rc::clone(&self.inner),
        }
    }
}

impl<A, H> PaymentSession<A, H>
where
    A: TransactionApi + 'static,
    H: PayboxHost + 'static,
{
    pub fn new(api: A, host: H, settings: PayboxSettings, callbacks: SessionCallbacks) -> Self {
        Self {
            inner: Rc::new(Inner {
                api,
                host,
                settings,
                callbacks,
                plan: Cell::new(PlanKey::default()),
                in_flight: Cell::new(false),
                vendor_activation: Cell::new(false),
                status: RefCell::new(None),
            }),
        }
    }

    pub fn selected_plan(&self) -> PlanKey {
        self.inner.plan.get()
    }

    pub fn is_in_flight(&self) -> bool {
        self.inner.in_flight.get()
    }

    pub fn status(&self) -> Option<String> {
        self.inner.status.borrow().clone()
    }

    /// Select `plan` and release the single-flight guard.
    pub fn select_plan(&self, plan: PlanKey) {
        info!(%plan, "plan selected");
        self.inner.plan.set(plan);
        self.inner.in_flight.set(false);
    }

    /// Select a plan by its key; unknown keys leave the selection as is.
    pub fn select_plan_key(&self, key: &str) -> Result<PlanKey, PayboxError> {
        let plan = key.parse::<PlanKey>()?;
        self.select_plan(plan);
        Ok(plan)
    }

    /// Handle a click on the pay button.
    pub fn activate(&self) -> Activation<A, H> {
        let inner = &self.inner;
        if inner.vendor_activation.get() {
            debug!("activation left to the Paybox listener");
            return Activation::Vendor;
        }
        if inner.in_flight.get() {
            info!("click ignored: already processing");
            return Activation::Busy;
        }
        inner.in_flight.set(true);
        inner.set_status(None);
        Activation::Started(Attempt {
            session: self.clone(),
            plan: inner.plan.get(),
        })
    }

    /// [`activate`](Self::activate) and run the attempt, if any.
    pub async fn pay(&self) -> PayOutcome {
        match self.activate() {
            Activation::Vendor => PayOutcome::Vendor,
            Activation::Busy => PayOutcome::Ignored,
            Activation::Started(attempt) => attempt.run().await,
        }
    }
}

impl<A, H: PayboxHost> Inner<A, H> {
    fn set_status(&self, status: Option<String>) {
        *self.status.borrow_mut() = status.clone();
        self.callbacks.on_status.emit(status);
    }

    fn fail(&self, err: PayboxError) -> PayOutcome {
        error!(%err, "error during payment init");
        self.set_status(Some(error_message(&err)));
        self.in_flight.set(false);
        PayOutcome::Failed(err)
    }

    fn authorized(&self, response: AuthorizeResponse) {
        info!(status = ?response.status, "authorization result received");
        self.set_status(Some(response.message()));
        self.callbacks.on_authorize.emit(response);
    }

    /// Release the guard and replay the activation for the vendor listener.
    fn hand_to_vendor(&self) {
        self.in_flight.set(false);
        self.vendor_activation.set(true);
        debug!(element_id = %self.settings.button_id, "triggering Paybox button");
        self.host.activate(&self.settings.button_id);
        self.vendor_activation.set(false);
    }
}

/// One payment attempt holding the single-flight guard.
pub struct Attempt<A, H> {
    session: PaymentSession<A, H>,
    plan: PlanKey,
}

impl<A, H> Attempt<A, H>
where
    A: TransactionApi + 'static,
    H: PayboxHost + 'static,
{
    pub async fn run(self) -> PayOutcome {
        let inner = &self.session.inner;
        info!(plan = %self.plan, "initiating payment");

        let payload = match inner.api.create_transaction(self.plan).await {
            Ok(payload) => payload,
            Err(err) => return inner.fail(err),
        };
        debug!(?payload, "received transaction payload");

        let data = PayboxData::new(&inner.settings, &payload);
        let session: Weak<Inner<A, H>> = Rc::downgrade(inner);
        let on_authorize = Box::new(move |response: AuthorizeResponse| {
            if let Some(inner) = session.upgrade() {
                inner.authorized(response);
            }
        });
        if let Err(err) = inner.host.publish(&data, on_authorize) {
            return inner.fail(err);
        }
        debug!(?data, "global data and onAuthorize configured");

        if !inner.host.has_trigger(&inner.settings.button_id) {
            warn!(element_id = %inner.settings.button_id, "trigger element missing, cannot start Paybox");
            inner.in_flight.set(false);
            return PayOutcome::TriggerMissing;
        }

        let deferred = Rc::clone(inner);
        inner.host.defer(Box::new(move || deferred.hand_to_vendor()));
        PayOutcome::HandedOff {
            transaction_id: payload.transaction_id,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::handoff::{AuthorizeHandler, DeferredTask};
    use crate::transaction::{parse_create_response, TransactionPayload};
    use futures::executor::block_on;

    /// Transaction API answering every request with the same canned response.
    #[derive(Clone)]
    struct FakeApi {
        requests: Rc<RefCell<Vec<PlanKey>>>,
        response: Result<TransactionPayload, PayboxError>,
    }

    impl FakeApi {
        fn ok(payload: TransactionPayload) -> Self {
            Self {
                requests: Rc::default(),
                response: Ok(payload),
            }
        }

        fn err(err: PayboxError) -> Self {
            Self {
                requests: Rc::default(),
                response: Err(err),
            }
        }
    }

    impl TransactionApi for FakeApi {
        async fn create_transaction(
            &self,
            plan: PlanKey,
        ) -> Result<TransactionPayload, PayboxError> {
            self.requests.borrow_mut().push(plan);
            self.response.clone()
        }
    }

    /// Host recording the handoff instead of touching a page.
    #[derive(Clone)]
    struct FakeHost {
        published: Rc<RefCell<Vec<PayboxData>>>,
        on_authorize: Rc<RefCell<Option<AuthorizeHandler>>>,
        deferred: Rc<RefCell<Vec<DeferredTask>>>,
        activations: Rc<RefCell<Vec<String>>>,
        trigger_present: bool,
        publish_error: Option<PayboxError>,
        // Invoked from `activate`, standing in for listeners on the button.
        on_activate: Rc<RefCell<Option<Box<dyn Fn()>>>>,
    }

    impl Default for FakeHost {
        fn default() -> Self {
            Self {
                published: Rc::default(),
                on_authorize: Rc::default(),
                deferred: Rc::default(),
                activations: Rc::default(),
                trigger_present: true,
                publish_error: None,
                on_activate: Rc::default(),
            }
        }
    }

    impl FakeHost {
        /// Run everything deferred so far, as the next macrotask would.
        fn tick(&self) {
            let tasks: Vec<DeferredTask> = self.deferred.borrow_mut().drain(..).collect();
            for task in tasks {
                task();
            }
        }

        fn authorize(&self, response: AuthorizeResponse) {
            let slot = self.on_authorize.borrow();
            let handler = slot.as_ref().expect("onAuthorize not published");
            handler(response);
        }
    }

    impl PayboxHost for FakeHost {
        fn publish(
            &self,
            data: &PayboxData,
            on_authorize: AuthorizeHandler,
        ) -> Result<(), PayboxError> {
            if let Some(err) = &self.publish_error {
                return Err(err.clone());
            }
            self.published.borrow_mut().push(data.clone());
            self.on_authorize.borrow_mut().replace(on_authorize);
            Ok(())
        }

        fn has_trigger(&self, _element_id: &str) -> bool {
            self.trigger_present
        }

        fn defer(&self, task: DeferredTask) {
            self.deferred.borrow_mut().push(task);
        }

        fn activate(&self, element_id: &str) {
            self.activations.borrow_mut().push(element_id.to_string());
            if let Some(listener) = self.on_activate.borrow().as_ref() {
                listener();
            }
        }
    }

    fn payload(id: &str, base12: f64, description: &str) -> TransactionPayload {
        TransactionPayload {
            transaction_id: id.into(),
            base0: 0.0,
            base12,
            description: description.into(),
        }
    }

    fn session(api: FakeApi, host: FakeHost) -> PaymentSession<FakeApi, FakeHost> {
        PaymentSession::new(
            api,
            host,
            PayboxSettings::default(),
            SessionCallbacks::default(),
        )
    }

    #[test]
    fn each_plan_issues_exactly_one_request_with_its_key() {
        for plan in crate::catalog::PRICING.iter().map(|p| p.key) {
            let api = FakeApi::ok(payload("tx", 1.0, "pack"));
            let session = session(api.clone(), FakeHost::default());
            session.select_plan(plan);

            let outcome = block_on(session.pay());

            assert_eq!(
                outcome,
                PayOutcome::HandedOff {
                    transaction_id: "tx".into()
                }
            );
            assert_eq!(*api.requests.borrow(), vec![plan]);
        }
    }

    #[test]
    fn second_activation_while_in_flight_is_a_no_op() {
        let api = FakeApi::ok(payload("tx", 1.0, "pack"));
        let session = session(api.clone(), FakeHost::default());

        let first = session.activate();
        let second = session.activate();
        assert!(matches!(second, Activation::Busy));

        let Activation::Started(attempt) = first else {
            panic!("first activation should start an attempt");
        };
        block_on(attempt.run());

        // still guarded until the deferred re-activation runs
        assert_eq!(block_on(session.pay()), PayOutcome::Ignored);
        assert_eq!(api.requests.borrow().len(), 1);
    }

    #[test]
    fn server_error_is_shown_and_releases_the_guard() {
        let err = parse_create_response(400, r#"{"error":"bad plan"}"#).unwrap_err();
        let api = FakeApi::err(err.clone());
        let host = FakeHost::default();
        let session = session(api, host.clone());

        assert_eq!(block_on(session.pay()), PayOutcome::Failed(err));

        let status = session.status().unwrap();
        assert!(status.contains("bad plan"), "status was {status:?}");
        assert!(!session.is_in_flight());
        assert!(host.published.borrow().is_empty());
        assert!(host.deferred.borrow().is_empty());
    }

    #[test]
    fn network_error_leaves_widget_ready_for_another_attempt() {
        let api = FakeApi::err(PayboxError::Network("connection refused".into()));
        let session = session(api.clone(), FakeHost::default());

        block_on(session.pay());
        assert_eq!(
            session.status().as_deref(),
            Some("Error: network error: connection refused")
        );

        block_on(session.pay());
        assert_eq!(api.requests.borrow().len(), 2);
    }

    #[test]
    fn authorization_results_update_the_status() {
        let host = FakeHost::default();
        let session = session(
            FakeApi::ok(payload("tx", 1.0, "pack")),
            host.clone(),
        );
        block_on(session.pay());

        host.authorize(AuthorizeResponse::with_status("succeeded"));
        assert_eq!(session.status().as_deref(), Some("Pago autorizado"));

        host.authorize(AuthorizeResponse::with_status("cancelled"));
        assert!(session.status().unwrap().contains("cancelled"));
    }

    #[test]
    fn listeners_receive_status_and_raw_response() {
        let statuses = Rc::new(RefCell::new(Vec::new()));
        let responses = Rc::new(RefCell::new(Vec::new()));
        let callbacks = SessionCallbacks {
            on_status: {
                let statuses = statuses.clone();
                Callback::from(move |s: Option<String>| statuses.borrow_mut().push(s))
            },
            on_authorize: {
                let responses = responses.clone();
                Callback::from(move |r: AuthorizeResponse| responses.borrow_mut().push(r))
            },
        };
        let host = FakeHost::default();
        let session = PaymentSession::new(
            FakeApi::ok(payload("tx", 1.0, "pack")),
            host.clone(),
            PayboxSettings::default(),
            callbacks,
        );

        block_on(session.pay());
        host.authorize(AuthorizeResponse::with_status("succeeded"));

        assert_eq!(
            *statuses.borrow(),
            vec![None, Some("Pago autorizado".to_string())]
        );
        assert_eq!(responses.borrow().len(), 1);
        assert!(responses.borrow()[0].is_success());
    }

    #[test]
    fn changing_plan_always_clears_the_guard() {
        let api = FakeApi::ok(payload("tx", 1.0, "pack"));
        let session = session(api.clone(), FakeHost::default());

        block_on(session.pay());
        assert!(session.is_in_flight());

        session.select_plan(PlanKey::Pro);
        assert!(!session.is_in_flight());

        block_on(session.pay());
        assert_eq!(*api.requests.borrow(), vec![PlanKey::Starter, PlanKey::Pro]);
    }

    #[test]
    fn unknown_plan_keys_are_rejected() {
        let session = session(FakeApi::ok(payload("tx", 1.0, "pack")), FakeHost::default());
        session.select_plan(PlanKey::Business);

        assert!(session.select_plan_key("gold").is_err());
        assert_eq!(session.selected_plan(), PlanKey::Business);
        assert_eq!(session.select_plan_key("pro"), Ok(PlanKey::Pro));
    }

    #[test]
    fn starter_scenario_publishes_vendor_data() {
        let host = FakeHost::default();
        let session = session(
            FakeApi::ok(payload("tx1", 10.0, "Starter pack")),
            host.clone(),
        );
        session.select_plan(PlanKey::Starter);
        block_on(session.pay());

        let published = host.published.borrow();
        assert_eq!(published.len(), 1);
        assert_eq!(published[0].base12, "10");
        assert_eq!(published[0].base0, "0");
        assert_eq!(published[0].element_id, "paybox-pay-button");
        assert_eq!(published[0].description, "Starter pack");
        assert_eq!(published[0].extras, "tx1");
    }

    #[test]
    fn reactivation_is_deferred_and_releases_the_guard_first() {
        let host = FakeHost::default();
        let session = session(FakeApi::ok(payload("tx", 1.0, "pack")), host.clone());

        block_on(session.pay());
        assert!(host.activations.borrow().is_empty());
        assert_eq!(host.deferred.borrow().len(), 1);

        let seen_in_flight = Rc::new(Cell::new(true));
        {
            let session = session.clone();
            let seen_in_flight = seen_in_flight.clone();
            host.on_activate
                .borrow_mut()
                .replace(Box::new(move || seen_in_flight.set(session.is_in_flight())));
        }
        host.tick();

        assert_eq!(*host.activations.borrow(), vec!["paybox-pay-button"]);
        assert!(!seen_in_flight.get());
        assert!(!session.is_in_flight());
    }

    #[test]
    fn reactivation_does_not_start_a_new_attempt() {
        let api = FakeApi::ok(payload("tx", 1.0, "pack"));
        let host = FakeHost::default();
        let session = session(api.clone(), host.clone());

        // the widget's own click handler, reached by the synthetic click
        let outcomes = Rc::new(RefCell::new(Vec::new()));
        {
            let session = session.clone();
            let outcomes = outcomes.clone();
            host.on_activate.borrow_mut().replace(Box::new(move || {
                outcomes.borrow_mut().push(block_on(session.pay()));
            }));
        }

        block_on(session.pay());
        host.tick();

        assert_eq!(*outcomes.borrow(), vec![PayOutcome::Vendor]);
        assert_eq!(api.requests.borrow().len(), 1);

        // a real click afterwards starts a fresh attempt
        block_on(session.pay());
        assert_eq!(api.requests.borrow().len(), 2);
    }

    #[test]
    fn missing_trigger_releases_the_guard_without_deferring() {
        let host = FakeHost {
            trigger_present: false,
            ..FakeHost::default()
        };
        let session = session(FakeApi::ok(payload("tx", 1.0, "pack")), host.clone());

        assert_eq!(block_on(session.pay()), PayOutcome::TriggerMissing);
        assert!(!session.is_in_flight());
        assert!(host.deferred.borrow().is_empty());
    }

    #[test]
    fn publish_failure_is_reported() {
        let host = FakeHost {
            publish_error: Some(PayboxError::Host("no window".into())),
            ..FakeHost::default()
        };
        let session = session(FakeApi::ok(payload("tx", 1.0, "pack")), host.clone());

        assert!(matches!(block_on(session.pay()), PayOutcome::Failed(_)));
        assert_eq!(
            session.status().as_deref(),
            Some("Error: browser integration failed: no window")
        );
        assert!(!session.is_in_flight());
    }

    #[test]
    fn callback_of_a_dropped_session_is_inert() {
        let host = FakeHost::default();
        {
            let session = session(FakeApi::ok(payload("tx", 1.0, "pack")), host.clone());
            block_on(session.pay());
            host.deferred.borrow_mut().clear();
        }
        host.authorize(AuthorizeResponse::with_status("succeeded"));
    }
}
