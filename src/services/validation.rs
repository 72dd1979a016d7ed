// src/services/validation.rs

// O validador de reservas: o predicado completo que uma reserva candidata
// precisa satisfazer, avaliado em ordem fixa com curto-circuito na primeira
// falha. Funções puras sobre snapshots já carregados (o serviço trava as
// linhas e busca os dados; aqui não há I/O), o que mantém a regra testável
// sem banco.

use chrono::{DateTime, Duration, Utc};

use crate::{
    common::error::AppError,
    common::money::Cents,
    db::booking_repo::BookingWindow,
    models::{account::User, booking::Booking, slot::Slot},
};

/// Pedido de reserva já resolvido (identidade + payload).
#[derive(Debug, Clone, Copy)]
pub struct CandidateBooking {
    pub group_size: i32,
    /// Resgate de lugar reciclado pagando com pontos.
    pub redeem_points: bool,
}

/// Pedido aprovado: o valor a bloquear e a moeda do pagamento, já
/// resolvida contra a política do horário.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ApprovedBooking {
    pub amount: Cents,
    /// Bloqueia pontos em vez de créditos.
    pub paid_with_points: bool,
}

/// Valida o pedido na ordem do contrato e devolve o valor a bloquear e a
/// moeda (pontos 1:1 contra cêntimos no resgate de lugar reciclado).
///
/// Ordem: horário no futuro -> capacidade -> categoria -> duplicata ->
/// conflito de agenda -> fundos.
pub fn validate_booking(
    slot: &Slot,
    user: &User,
    candidate: CandidateBooking,
    active_on_slot: &[Booking],
    user_windows: &[BookingWindow],
    now: DateTime<Utc>,
    buffer: Duration,
) -> Result<ApprovedBooking, AppError> {
    // 1. O horário ainda não começou.
    if slot.start_at <= now {
        return Err(AppError::SlotExpired);
    }

    // 2. Capacidade: soma dos lugares ativos + pedido <= max_players.
    let taken: i64 = active_on_slot
        .iter()
        .filter(|b| b.is_active())
        .map(|b| i64::from(b.group_size))
        .sum();
    if taken + i64::from(candidate.group_size) > i64::from(slot.max_players) {
        return Err(AppError::SlotFull);
    }

    // 3. Categoria: nível dentro da faixa e gênero admitido,
    //    salvo horário OPEN/MIXTO.
    if !slot.level_admits(user.level) || !slot.gender_category.admits(user.gender) {
        return Err(AppError::CategoryMismatch);
    }

    // 4. Sem duplicata: nenhuma outra reserva ativa do usuário neste horário.
    if active_on_slot
        .iter()
        .any(|b| b.is_active() && b.user_id == user.id)
    {
        return Err(AppError::DuplicateBooking);
    }

    // 5. Conflito de agenda contra as demais reservas ativas do usuário.
    for window in user_windows {
        // A reserva duplicada no mesmo slot já foi tratada no passo 4.
        if window.slot_id == slot.id {
            continue;
        }
        if let Some(kind) =
            windows_conflict(slot.start_at, slot.end_at, window.start_at, window.end_at, buffer)
        {
            let detail = match kind {
                ConflictKind::Overlap => format!(
                    "sobrepõe sua reserva de {}",
                    window.start_at.format("%d/%m %H:%M")
                ),
                ConflictKind::Buffer => format!(
                    "menos de {} minutos de folga até sua reserva de {}",
                    buffer.num_minutes(),
                    window.start_at.format("%d/%m %H:%M")
                ),
            };
            return Err(AppError::TimeConflict(detail));
        }
    }

    // 6. Fundos: o saldo disponível cobre o preço do grupo.
    let price = slot.price_for(candidate.group_size);
    let paid_with_points = if candidate.redeem_points {
        // Resgate exige lugar reciclado disponível.
        if slot.available_recycled_slots < 1 {
            return Err(AppError::NoRecycledSeat);
        }
        if user.available_points() >= price.as_i64() {
            true
        } else if slot.recycled_only_points {
            // Política "só pontos": créditos não resgatam este lugar.
            return Err(AppError::InsufficientPoints);
        } else if user.available_credits() >= price {
            // Lugar reciclado elegível a créditos: o resgate cai para
            // créditos quando os pontos não cobrem.
            false
        } else {
            return Err(AppError::InsufficientCredits);
        }
    } else {
        if user.available_credits() < price {
            return Err(AppError::InsufficientCredits);
        }
        false
    };

    Ok(ApprovedBooking {
        amount: price,
        paid_with_points,
    })
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConflictKind {
    /// As janelas se sobrepõem.
    Overlap,
    /// Folga menor ou igual ao buffer entre o fim de uma e o início da outra.
    Buffer,
}

/// Teste de conflito entre a janela candidata e uma janela existente.
///
/// Sobreposição: `existing.start < cand.end && existing.end > cand.start`.
/// Folga: a distância entre o fim da janela mais cedo e o início da mais
/// tarde é <= buffer, nos dois sentidos. Reservas coladas (folga zero)
/// também violam a folga: é o tempo de deslocamento/troca de quadra.
pub fn windows_conflict(
    cand_start: DateTime<Utc>,
    cand_end: DateTime<Utc>,
    existing_start: DateTime<Utc>,
    existing_end: DateTime<Utc>,
    buffer: Duration,
) -> Option<ConflictKind> {
    if existing_start < cand_end && existing_end > cand_start {
        return Some(ConflictKind::Overlap);
    }

    let gap = if existing_end <= cand_start {
        cand_start - existing_end
    } else {
        existing_start - cand_end
    };
    if gap <= buffer {
        return Some(ConflictKind::Buffer);
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::account::Gender;
    use crate::models::booking::BookingStatus;
    use crate::models::slot::GenderCategory;
    use chrono::TimeZone;
    use uuid::Uuid;

    fn at(hour: u32, min: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 9, 10, hour, min, 0).unwrap()
    }

    fn buffer() -> Duration {
        Duration::minutes(30)
    }

    fn slot(start: DateTime<Utc>, end: DateTime<Utc>) -> Slot {
        Slot {
            id: Uuid::new_v4(),
            club_id: Uuid::new_v4(),
            instructor_id: None,
            start_at: start,
            end_at: end,
            level: 35,
            level_min: Some(30),
            level_max: Some(40),
            gender_category: GenderCategory::Mixto,
            max_players: 4,
            // 80 € pelo horário inteiro -> 20 € por lugar.
            total_price: Cents::from_euros(80),
            court_id: None,
            court_number: None,
            recycled_only_points: true,
            available_recycled_slots: 0,
            created_at: None,
        }
    }

    fn user() -> User {
        User {
            id: Uuid::new_v4(),
            club_id: Uuid::new_v4(),
            name: "María".into(),
            email: "maria@example.com".into(),
            gender: Gender::Femenino,
            level: 35,
            credits: Cents::from_euros(100),
            blocked_credits: Cents::ZERO,
            points: 0,
            blocked_points: 0,
            created_at: None,
        }
    }

    fn booking_on(slot_id: Uuid, user_id: Uuid, group_size: i32) -> Booking {
        Booking {
            id: Uuid::new_v4(),
            user_id,
            slot_id,
            group_size,
            status: BookingStatus::Pending,
            amount_blocked: Cents::from_euros(20),
            paid_with_points: false,
            used_recycled_seat: false,
            is_recycled: false,
            was_confirmed: false,
            created_at: None,
        }
    }

    fn window(start: DateTime<Utc>, end: DateTime<Utc>) -> BookingWindow {
        BookingWindow {
            booking_id: Uuid::new_v4(),
            slot_id: Uuid::new_v4(),
            start_at: start,
            end_at: end,
        }
    }

    fn candidate() -> CandidateBooking {
        CandidateBooking {
            group_size: 1,
            redeem_points: false,
        }
    }

    // --- Regra da folga de 30 minutos (exemplo do contrato) ---
    // Reserva existente das 15:00 às 16:00:

    #[test]
    fn candidata_sobreposta_e_rejeitada() {
        // 14:30-15:30 sobrepõe 15:00-16:00.
        assert_eq!(
            windows_conflict(at(14, 30), at(15, 30), at(15, 0), at(16, 0), buffer()),
            Some(ConflictKind::Overlap)
        );
    }

    #[test]
    fn candidata_terminando_30min_antes_viola_a_folga() {
        // 13:30-14:30 termina 30 minutos antes das 15:00.
        assert_eq!(
            windows_conflict(at(13, 30), at(14, 30), at(15, 0), at(16, 0), buffer()),
            Some(ConflictKind::Buffer)
        );
    }

    #[test]
    fn candidata_com_uma_hora_de_folga_e_aceita() {
        // 13:00-14:00 termina uma hora antes das 15:00.
        assert_eq!(
            windows_conflict(at(13, 0), at(14, 0), at(15, 0), at(16, 0), buffer()),
            None
        );
    }

    #[test]
    fn folga_vale_nos_dois_sentidos() {
        // Existente 13:00-14:00; candidata começando 14:30 viola a folga.
        assert_eq!(
            windows_conflict(at(14, 30), at(15, 30), at(13, 0), at(14, 0), buffer()),
            Some(ConflictKind::Buffer)
        );
        // Começando 15:00 (uma hora de folga), aceita.
        assert_eq!(
            windows_conflict(at(15, 0), at(16, 0), at(13, 0), at(14, 0), buffer()),
            None
        );
    }

    #[test]
    fn reservas_coladas_violam_a_folga() {
        assert_eq!(
            windows_conflict(at(16, 0), at(17, 0), at(15, 0), at(16, 0), buffer()),
            Some(ConflictKind::Buffer)
        );
    }

    // --- Pipeline completo ---

    #[test]
    fn horario_passado_e_rejeitado_antes_de_tudo() {
        let s = slot(at(10, 0), at(11, 0));
        let u = user();
        let err = validate_booking(&s, &u, candidate(), &[], &[], at(12, 0), buffer());
        assert!(matches!(err, Err(AppError::SlotExpired)));
    }

    #[test]
    fn capacidade_conta_group_size() {
        let s = slot(at(15, 0), at(16, 0));
        let u = user();
        // 3 lugares tomados de 4; pedir 2 estoura.
        let existing = vec![booking_on(s.id, Uuid::new_v4(), 3)];
        let cand = CandidateBooking {
            group_size: 2,
            redeem_points: false,
        };
        let err = validate_booking(&s, &u, cand, &existing, &[], at(9, 0), buffer());
        assert!(matches!(err, Err(AppError::SlotFull)));

        // Pedir 1 ainda cabe.
        let cand = CandidateBooking {
            group_size: 1,
            redeem_points: false,
        };
        let ok = validate_booking(&s, &u, cand, &existing, &[], at(9, 0), buffer());
        assert_eq!(ok.unwrap().amount, Cents::from_euros(20));
    }

    #[test]
    fn categoria_rejeita_nivel_fora_da_faixa() {
        let s = slot(at(15, 0), at(16, 0));
        let mut u = user();
        u.level = 45; // faixa do slot: 30-40
        let err = validate_booking(&s, &u, candidate(), &[], &[], at(9, 0), buffer());
        assert!(matches!(err, Err(AppError::CategoryMismatch)));
    }

    #[test]
    fn categoria_rejeita_genero_incompativel() {
        let mut s = slot(at(15, 0), at(16, 0));
        s.gender_category = GenderCategory::Masculino;
        let u = user(); // Femenino
        let err = validate_booking(&s, &u, candidate(), &[], &[], at(9, 0), buffer());
        assert!(matches!(err, Err(AppError::CategoryMismatch)));

        // OPEN ignora a categoria.
        s.gender_category = GenderCategory::Open;
        assert!(validate_booking(&s, &u, candidate(), &[], &[], at(9, 0), buffer()).is_ok());
    }

    #[test]
    fn duplicata_no_mesmo_horario_e_rejeitada() {
        let s = slot(at(15, 0), at(16, 0));
        let u = user();
        let existing = vec![booking_on(s.id, u.id, 1)];
        let err = validate_booking(&s, &u, candidate(), &existing, &[], at(9, 0), buffer());
        assert!(matches!(err, Err(AppError::DuplicateBooking)));
    }

    #[test]
    fn conflito_de_agenda_usa_as_janelas_do_usuario() {
        let s = slot(at(14, 30), at(15, 30));
        let u = user();
        let windows = vec![window(at(15, 0), at(16, 0))];
        let err = validate_booking(&s, &u, candidate(), &[], &windows, at(9, 0), buffer());
        assert!(matches!(err, Err(AppError::TimeConflict(_))));
    }

    #[test]
    fn fundos_insuficientes_sao_a_ultima_checagem() {
        let s = slot(at(15, 0), at(16, 0));
        let mut u = user();
        u.credits = Cents::from_euros(10); // preço: 20 €
        let err = validate_booking(&s, &u, candidate(), &[], &[], at(9, 0), buffer());
        assert!(matches!(err, Err(AppError::InsufficientCredits)));

        // Créditos bloqueados contam contra o disponível.
        u.credits = Cents::from_euros(30);
        u.blocked_credits = Cents::from_euros(15);
        let err = validate_booking(&s, &u, candidate(), &[], &[], at(9, 0), buffer());
        assert!(matches!(err, Err(AppError::InsufficientCredits)));
    }

    #[test]
    fn resgate_com_pontos_exige_lugar_reciclado() {
        let mut s = slot(at(15, 0), at(16, 0));
        let mut u = user();
        u.points = 10_000;
        let cand = CandidateBooking {
            group_size: 1,
            redeem_points: true,
        };

        let err = validate_booking(&s, &u, cand, &[], &[], at(9, 0), buffer());
        assert!(matches!(err, Err(AppError::NoRecycledSeat)));

        s.available_recycled_slots = 1;
        let approved = validate_booking(&s, &u, cand, &[], &[], at(9, 0), buffer()).unwrap();
        assert_eq!(approved.amount, Cents::from_euros(20));
        assert!(approved.paid_with_points);

        // Pontos resgatam 1:1 contra cêntimos.
        u.points = 1_000;
        let err = validate_booking(&s, &u, cand, &[], &[], at(9, 0), buffer());
        assert!(matches!(err, Err(AppError::InsufficientPoints)));
    }

    #[test]
    fn politica_do_horario_decide_a_moeda_do_resgate() {
        let mut s = slot(at(15, 0), at(16, 0));
        s.available_recycled_slots = 1;
        let u = user(); // 100 € em créditos, zero pontos.
        let cand = CandidateBooking {
            group_size: 1,
            redeem_points: true,
        };

        // Política "só pontos": créditos não resgatam o lugar.
        s.recycled_only_points = true;
        let err = validate_booking(&s, &u, cand, &[], &[], at(9, 0), buffer());
        assert!(matches!(err, Err(AppError::InsufficientPoints)));

        // Política aberta: o mesmo pedido cai para créditos.
        s.recycled_only_points = false;
        let approved = validate_booking(&s, &u, cand, &[], &[], at(9, 0), buffer()).unwrap();
        assert!(!approved.paid_with_points);
        assert_eq!(approved.amount, Cents::from_euros(20));
    }

    #[test]
    fn resgate_prefere_pontos_quando_o_saldo_cobre() {
        let mut s = slot(at(15, 0), at(16, 0));
        s.recycled_only_points = false;
        s.available_recycled_slots = 1;
        let mut u = user();
        u.points = 10_000;
        let cand = CandidateBooking {
            group_size: 1,
            redeem_points: true,
        };

        let approved = validate_booking(&s, &u, cand, &[], &[], at(9, 0), buffer()).unwrap();
        assert!(approved.paid_with_points);
    }

    #[test]
    fn preco_bloqueado_e_proporcional_em_centimos() {
        // Horário de 40 € para 4 jogadores; grupo de 2 bloqueia 20 €.
        let mut s = slot(at(15, 0), at(16, 0));
        s.total_price = Cents::from_euros(40);
        let u = user();
        let cand = CandidateBooking {
            group_size: 2,
            redeem_points: false,
        };
        let approved = validate_booking(&s, &u, cand, &[], &[], at(9, 0), buffer()).unwrap();
        // Sempre 2000 cêntimos, nunca "20".
        assert_eq!(approved.amount, Cents(2000));
    }
}
