// src/services/notification_service.rs

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use tokio::sync::{watch, RwLock};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::{QuoteRepository, StateRepository},
    models::{
        notification::{CreateNotificationRequest, Notification, NotificationKind},
        quote::{Quote, QuoteStatus},
    },
};

// Chaves herdadas do armazenamento do navegador; manter os nomes preserva os
// dados de quem migra de uma instalação antiga.
const KEY_NOTIFICATIONS: &str = "orcafacil_notifications";
const KEY_VIEWED: &str = "orcafacil_viewed_notifications";

const POLL_INTERVAL: Duration = Duration::from_secs(5 * 60);
const EXPIRING_WINDOW_DAYS: i64 = 7;
const APPROVED_WINDOW_HOURS: i64 = 24;

struct Cache {
    notifications: Vec<Notification>,
    viewed: Vec<String>,
}

struct Inner {
    quote_repo: QuoteRepository,
    state_repo: StateRepository,
    cache: RwLock<Cache>,
}

// Lista de alertas em memória, espelhada no estado persistente a cada
// mutação. A mais recente fica sempre na frente.
#[derive(Clone)]
pub struct NotificationService {
    inner: Arc<Inner>,
}

impl NotificationService {
    pub async fn load(
        quote_repo: QuoteRepository,
        state_repo: StateRepository,
    ) -> Result<Self, AppError> {
        let notifications = read_json(&state_repo, KEY_NOTIFICATIONS).await?;
        let viewed = read_json(&state_repo, KEY_VIEWED).await?;

        Ok(Self {
            inner: Arc::new(Inner {
                quote_repo,
                state_repo,
                cache: RwLock::new(Cache { notifications, viewed }),
            }),
        })
    }

    pub async fn list(&self) -> Vec<Notification> {
        self.inner.cache.read().await.notifications.clone()
    }

    pub async fn add(&self, payload: CreateNotificationRequest) -> Result<Notification, AppError> {
        let notification = Notification {
            id: Uuid::new_v4(),
            title: payload.title,
            message: payload.message,
            kind: payload.kind,
            timestamp: Utc::now(),
            read: false,
            link: payload.link,
            notification_id: None,
        };

        let mut cache = self.inner.cache.write().await;
        cache.notifications.insert(0, notification.clone());
        self.persist(&cache).await?;
        Ok(notification)
    }

    pub async fn mark_read(&self, id: Uuid) -> Result<Notification, AppError> {
        let mut cache = self.inner.cache.write().await;
        let notification = cache
            .notifications
            .iter_mut()
            .find(|n| n.id == id)
            .ok_or(AppError::NotificationNotFound)?;
        notification.read = true;
        let updated = notification.clone();

        self.persist(&cache).await?;
        Ok(updated)
    }

    // Clique em um alerta: o id estável vai para a lista de vistos e o alerta
    // sai da lista ativa, senão a mesma condição ressurgiria a cada varredura.
    pub async fn mark_viewed(&self, id: Uuid) -> Result<(), AppError> {
        let mut cache = self.inner.cache.write().await;
        let position = cache
            .notifications
            .iter()
            .position(|n| n.id == id)
            .ok_or(AppError::NotificationNotFound)?;

        let removed = cache.notifications.remove(position);
        if let Some(stable_id) = removed.notification_id {
            if !cache.viewed.contains(&stable_id) {
                cache.viewed.push(stable_id);
            }
        }

        self.persist(&cache).await?;
        Ok(())
    }

    pub async fn remove(&self, id: Uuid) -> Result<(), AppError> {
        let mut cache = self.inner.cache.write().await;
        let position = cache
            .notifications
            .iter()
            .position(|n| n.id == id)
            .ok_or(AppError::NotificationNotFound)?;
        cache.notifications.remove(position);

        self.persist(&cache).await?;
        Ok(())
    }

    // Esvazia a lista ativa e persiste imediatamente. A lista de vistos não é
    // tocada: os alertas limpos não devem ressurgir na próxima varredura.
    pub async fn clear_all(&self) -> Result<(), AppError> {
        let mut cache = self.inner.cache.write().await;
        cache.notifications.clear();
        self.persist(&cache).await?;
        Ok(())
    }

    // Um ciclo de varredura: avalia os dois gatilhos para cada orçamento e
    // põe os alertas inéditos na frente da lista.
    pub async fn scan_quotes(&self) -> Result<usize, AppError> {
        let quotes = self.inner.quote_repo.list_all().await?;
        let now = Utc::now();

        let mut cache = self.inner.cache.write().await;
        let mut fresh = pending_alerts(&quotes, &cache.notifications, &cache.viewed, now);
        if fresh.is_empty() {
            return Ok(0);
        }

        let count = fresh.len();
        fresh.append(&mut cache.notifications);
        cache.notifications = fresh;
        self.persist(&cache).await?;

        tracing::info!("🔔 {} novo(s) alerta(s) de orçamento.", count);
        Ok(count)
    }

    // Varredura imediata na subida e depois a cada 5 minutos. Uma falha é
    // registrada e o ciclo segue para a próxima rodada.
    pub fn spawn_poller(self, mut shutdown: watch::Receiver<bool>) -> tokio::task::JoinHandle<()> {
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(POLL_INTERVAL);
            loop {
                tokio::select! {
                    _ = ticker.tick() => {
                        if let Err(e) = self.scan_quotes().await {
                            tracing::error!("❌ Varredura de notificações falhou: {}", e);
                        }
                    }
                    _ = shutdown.changed() => break,
                }
            }
        })
    }

    async fn persist(&self, cache: &Cache) -> Result<(), AppError> {
        let notifications =
            serde_json::to_string(&cache.notifications).map_err(anyhow::Error::from)?;
        self.inner.state_repo.put(KEY_NOTIFICATIONS, &notifications).await?;

        let viewed = serde_json::to_string(&cache.viewed).map_err(anyhow::Error::from)?;
        self.inner.state_repo.put(KEY_VIEWED, &viewed).await?;
        Ok(())
    }
}

// Estado ilegível não derruba o serviço: registra e recomeça vazio.
async fn read_json<T: DeserializeOwned + Default>(
    repo: &StateRepository,
    key: &str,
) -> Result<T, AppError> {
    match repo.get(key).await? {
        None => Ok(T::default()),
        Some(raw) => match serde_json::from_str(&raw) {
            Ok(value) => Ok(value),
            Err(e) => {
                tracing::warn!("⚠️ Estado '{}' ilegível ({}). Começando vazio.", key, e);
                Ok(T::default())
            }
        },
    }
}

// Dias até o vencimento, arredondando para cima: qualquer fração de dia
// restante conta como um dia inteiro.
fn days_until(valid_until: &DateTime<Utc>, now: &DateTime<Utc>) -> i64 {
    let seconds = (*valid_until - *now).num_seconds();
    (seconds as f64 / 86_400.0).ceil() as i64
}

fn hours_since(instant: &DateTime<Utc>, now: &DateTime<Utc>) -> i64 {
    let seconds = (*now - *instant).num_seconds();
    (seconds as f64 / 3_600.0).ceil() as i64
}

// Vence em até 7 dias e ainda não venceu. Rascunhos não alertam.
fn expiring_soon(quote: &Quote, now: &DateTime<Utc>) -> bool {
    if quote.status == QuoteStatus::Draft {
        return false;
    }
    let days = days_until(&quote.valid_until, now);
    days > 0 && days <= EXPIRING_WINDOW_DAYS
}

// Aprovado com menos de 24 horas de vida. A janela conta a partir da criação
// do orçamento, não da aprovação.
fn recently_approved(quote: &Quote, now: &DateTime<Utc>) -> bool {
    quote.status == QuoteStatus::Approved
        && hours_since(&quote.created_at, now) <= APPROVED_WINDOW_HOURS
}

fn already_listed(notifications: &[Notification], quote_id: i64, needle: &str) -> bool {
    let tag = format!("Orçamento #{quote_id}");
    notifications
        .iter()
        .any(|n| n.title.contains(&tag) && n.message.contains(needle))
}

fn pending_alerts(
    quotes: &[Quote],
    current: &[Notification],
    viewed: &[String],
    now: DateTime<Utc>,
) -> Vec<Notification> {
    let mut fresh = Vec::new();

    for quote in quotes {
        let stable_id = format!("expiring_{}", quote.id);
        if expiring_soon(quote, &now)
            && !already_listed(current, quote.id, "expira")
            && !viewed.contains(&stable_id)
        {
            fresh.push(alert(
                quote,
                NotificationKind::Warning,
                format!("Orçamento #{} expira em breve", quote.id),
                format!("O orçamento \"{}\" expira em breve.", quote.title),
                stable_id,
                now,
            ));
        }

        let stable_id = format!("approved_{}", quote.id);
        if recently_approved(quote, &now)
            && !already_listed(current, quote.id, "aprovado")
            && !viewed.contains(&stable_id)
        {
            fresh.push(alert(
                quote,
                NotificationKind::Success,
                format!("Orçamento #{} aprovado", quote.id),
                format!("O orçamento \"{}\" foi aprovado!", quote.title),
                stable_id,
                now,
            ));
        }
    }

    fresh
}

fn alert(
    quote: &Quote,
    kind: NotificationKind,
    title: String,
    message: String,
    stable_id: String,
    now: DateTime<Utc>,
) -> Notification {
    Notification {
        id: Uuid::new_v4(),
        title,
        message,
        kind,
        timestamp: now,
        read: false,
        link: Some(format!("/orcamentos/{}?modo=visualizar", quote.id)),
        notification_id: Some(stable_id),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::quote_repo::QuoteRecord;
    use crate::db::test_support::test_pool;
    use crate::db::ClientRepository;
    use crate::models::client::CreateClientRequest;
    use crate::models::quote::TaxDetails;
    use chrono::Duration as ChronoDuration;
    use sqlx::SqlitePool;

    async fn service(pool: &SqlitePool) -> NotificationService {
        NotificationService::load(
            QuoteRepository::new(pool.clone()),
            StateRepository::new(pool.clone()),
        )
        .await
        .unwrap()
    }

    async fn seed_quote(pool: &SqlitePool, status: QuoteStatus, valid_in_days: i64) -> i64 {
        let clients = ClientRepository::new(pool.clone());
        let client = match clients.find_by_id(1).await.unwrap() {
            Some(c) => c,
            None => clients
                .create(CreateClientRequest {
                    name: "Acme".to_string(),
                    document: None,
                    email: None,
                    phone: None,
                    address: None,
                })
                .await
                .unwrap(),
        };

        QuoteRepository::new(pool.clone())
            .create_with_items(
                QuoteRecord {
                    title: "Pintura do galpão".to_string(),
                    client_id: client.id,
                    status,
                    total: 100.0,
                    valid_until: Utc::now() + ChronoDuration::days(valid_in_days),
                    notes: None,
                    payment_method: None,
                    payment_terms: None,
                    custom_payment: None,
                    delivery_time: None,
                    include_taxes: false,
                    tax_details: TaxDetails::default(),
                },
                vec![],
            )
            .await
            .unwrap()
    }

    fn sample_quote(id: i64, status: QuoteStatus, valid_until: DateTime<Utc>) -> Quote {
        Quote {
            id,
            title: format!("Orçamento {id}"),
            client_id: 1,
            status,
            total: 0.0,
            valid_until,
            notes: None,
            payment_method: None,
            payment_terms: None,
            custom_payment: None,
            delivery_time: None,
            include_taxes: false,
            tax_details: TaxDetails::default(),
            created_at: Utc::now() - ChronoDuration::days(10),
        }
    }

    #[test]
    fn janela_de_expiracao_arredonda_para_cima() {
        let now = Utc::now();

        // faltando poucos segundos ainda conta como 1 dia
        let almost = sample_quote(1, QuoteStatus::Pending, now + ChronoDuration::seconds(30));
        assert!(expiring_soon(&almost, &now));

        let exact = sample_quote(2, QuoteStatus::Pending, now + ChronoDuration::days(7));
        assert!(expiring_soon(&exact, &now));

        let beyond = sample_quote(
            3,
            QuoteStatus::Pending,
            now + ChronoDuration::days(7) + ChronoDuration::hours(1),
        );
        assert!(!expiring_soon(&beyond, &now));

        let expired = sample_quote(4, QuoteStatus::Pending, now - ChronoDuration::hours(1));
        assert!(!expiring_soon(&expired, &now));
    }

    #[test]
    fn rascunho_nunca_alerta_expiracao() {
        let now = Utc::now();
        let draft = sample_quote(1, QuoteStatus::Draft, now + ChronoDuration::days(3));
        assert!(!expiring_soon(&draft, &now));
    }

    #[test]
    fn aprovacao_recente_conta_da_criacao() {
        let now = Utc::now();

        let mut fresh = sample_quote(1, QuoteStatus::Approved, now + ChronoDuration::days(30));
        fresh.created_at = now - ChronoDuration::hours(23);
        assert!(recently_approved(&fresh, &now));

        fresh.created_at = now - ChronoDuration::hours(25);
        assert!(!recently_approved(&fresh, &now));

        // status errado não alerta, por mais recente que seja
        let mut pending = sample_quote(2, QuoteStatus::Pending, now + ChronoDuration::days(30));
        pending.created_at = now;
        assert!(!recently_approved(&pending, &now));
    }

    #[tokio::test]
    async fn varredura_dupla_gera_um_unico_alerta() {
        let pool = test_pool().await;
        seed_quote(&pool, QuoteStatus::Pending, 3).await;
        let notifications = service(&pool).await;

        assert_eq!(notifications.scan_quotes().await.unwrap(), 1);
        assert_eq!(notifications.scan_quotes().await.unwrap(), 0);

        let list = notifications.list().await;
        assert_eq!(list.len(), 1);
        assert_eq!(list[0].kind, NotificationKind::Warning);
        assert_eq!(list[0].notification_id.as_deref(), Some("expiring_1"));
        assert_eq!(list[0].link.as_deref(), Some("/orcamentos/1?modo=visualizar"));
    }

    #[tokio::test]
    async fn alerta_visto_nao_ressurge_na_proxima_varredura() {
        let pool = test_pool().await;
        seed_quote(&pool, QuoteStatus::Pending, 5).await;
        let notifications = service(&pool).await;

        notifications.scan_quotes().await.unwrap();
        let id = notifications.list().await[0].id;

        notifications.mark_viewed(id).await.unwrap();
        assert!(notifications.list().await.is_empty());

        assert_eq!(notifications.scan_quotes().await.unwrap(), 0);
        assert!(notifications.list().await.is_empty());
    }

    #[tokio::test]
    async fn aprovado_e_vencendo_geram_dois_alertas() {
        let pool = test_pool().await;
        // criado agora (janela de 24h) e vencendo em 3 dias
        seed_quote(&pool, QuoteStatus::Approved, 3).await;
        let notifications = service(&pool).await;

        assert_eq!(notifications.scan_quotes().await.unwrap(), 2);

        let list = notifications.list().await;
        let kinds: Vec<NotificationKind> = list.iter().map(|n| n.kind).collect();
        assert!(kinds.contains(&NotificationKind::Warning));
        assert!(kinds.contains(&NotificationKind::Success));
        assert!(list.iter().any(|n| n.title == "Orçamento #1 aprovado"));
        assert!(list
            .iter()
            .any(|n| n.message == "O orçamento \"Pintura do galpão\" foi aprovado!"));
    }

    #[tokio::test]
    async fn limpar_tudo_persiste_e_sobrevive_ao_reinicio() {
        let pool = test_pool().await;
        let notifications = service(&pool).await;

        notifications
            .add(CreateNotificationRequest {
                title: "Backup concluído".to_string(),
                message: "O backup semanal terminou sem erros.".to_string(),
                kind: NotificationKind::Info,
                link: None,
            })
            .await
            .unwrap();
        assert_eq!(notifications.list().await.len(), 1);

        notifications.clear_all().await.unwrap();
        assert!(notifications.list().await.is_empty());

        // recarrega do estado persistido, como num reinício do servidor
        let reloaded = service(&pool).await;
        assert!(reloaded.list().await.is_empty());
    }

    #[tokio::test]
    async fn notificacoes_manuais_entram_na_frente_e_marcam_leitura() {
        let pool = test_pool().await;
        let notifications = service(&pool).await;

        notifications
            .add(CreateNotificationRequest {
                title: "Primeira".to_string(),
                message: "chegou antes".to_string(),
                kind: NotificationKind::Info,
                link: None,
            })
            .await
            .unwrap();
        let second = notifications
            .add(CreateNotificationRequest {
                title: "Segunda".to_string(),
                message: "chegou depois".to_string(),
                kind: NotificationKind::Info,
                link: None,
            })
            .await
            .unwrap();

        let list = notifications.list().await;
        assert_eq!(list[0].title, "Segunda");
        assert_eq!(list[1].title, "Primeira");

        let updated = notifications.mark_read(second.id).await.unwrap();
        assert!(updated.read);
        assert!(!notifications.list().await[1].read);
    }

    #[tokio::test]
    async fn remover_notificacao_inexistente_da_erro() {
        let pool = test_pool().await;
        let notifications = service(&pool).await;

        let err = notifications.remove(Uuid::new_v4()).await.unwrap_err();
        assert!(matches!(err, AppError::NotificationNotFound));
    }

    #[tokio::test]
    async fn estado_corrompido_recomeca_vazio() {
        let pool = test_pool().await;
        StateRepository::new(pool.clone())
            .put(KEY_NOTIFICATIONS, "isto não é json")
            .await
            .unwrap();

        let notifications = service(&pool).await;
        assert!(notifications.list().await.is_empty());
    }

    #[tokio::test]
    async fn alertas_persistem_entre_instancias() {
        let pool = test_pool().await;
        seed_quote(&pool, QuoteStatus::Pending, 2).await;

        let first = service(&pool).await;
        first.scan_quotes().await.unwrap();

        let second = service(&pool).await;
        let list = second.list().await;
        assert_eq!(list.len(), 1);
        assert_eq!(list[0].notification_id.as_deref(), Some("expiring_1"));
    }
}
