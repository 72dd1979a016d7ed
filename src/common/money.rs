// src/common/money.rs

use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Add, AddAssign, Sub, SubAssign};
use utoipa::ToSchema;

/// Valor monetário em cêntimos (menor unidade da moeda).
///
/// Todo valor de crédito atravessa o sistema como `Cents`; a conversão de
/// euros existe apenas na borda (seeds, payloads administrativos). Assim a
/// confusão euros/cêntimos vira erro de compilação, não script de reparo.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Default,
    Serialize,
    Deserialize,
    sqlx::Type,
    ToSchema,
)]
#[sqlx(transparent)]
#[serde(transparent)]
#[schema(value_type = i64, example = 2000)]
pub struct Cents(pub i64);

impl Cents {
    pub const ZERO: Cents = Cents(0);

    /// Constrói a partir de euros inteiros: 20 € -> 2000 cêntimos.
    pub fn from_euros(euros: i64) -> Self {
        Cents(euros * 100)
    }

    pub fn as_i64(self) -> i64 {
        self.0
    }

    pub fn is_negative(self) -> bool {
        self.0 < 0
    }

    /// Percentual inteiro, truncado para baixo (regra dos pontos de recompensa).
    pub fn percent(self, pct: i64) -> Self {
        Cents(self.0 * pct / 100)
    }
}

impl Add for Cents {
    type Output = Cents;
    fn add(self, rhs: Cents) -> Cents {
        Cents(self.0 + rhs.0)
    }
}

impl AddAssign for Cents {
    fn add_assign(&mut self, rhs: Cents) {
        self.0 += rhs.0;
    }
}

impl Sub for Cents {
    type Output = Cents;
    fn sub(self, rhs: Cents) -> Cents {
        Cents(self.0 - rhs.0)
    }
}

impl SubAssign for Cents {
    fn sub_assign(&mut self, rhs: Cents) {
        self.0 -= rhs.0;
    }
}

impl fmt::Display for Cents {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Exibição em euros apenas para logs e mensagens.
        write!(f, "{}.{:02} €", self.0 / 100, (self.0 % 100).abs())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_euros_usa_centimos() {
        assert_eq!(Cents::from_euros(20), Cents(2000));
        assert_eq!(Cents::from_euros(0), Cents::ZERO);
    }

    #[test]
    fn percentual_trunca_para_baixo() {
        assert_eq!(Cents(1999).percent(50), Cents(999));
        assert_eq!(Cents(2000).percent(100), Cents(2000));
        assert_eq!(Cents(2000).percent(0), Cents::ZERO);
    }

    #[test]
    fn exibicao_em_euros() {
        assert_eq!(Cents(2000).to_string(), "20.00 €");
        assert_eq!(Cents(2050).to_string(), "20.50 €");
        assert_eq!(Cents(5).to_string(), "0.05 €");
    }

    #[test]
    fn aritmetica_basica() {
        let mut saldo = Cents(5000);
        saldo -= Cents(2000);
        assert_eq!(saldo, Cents(3000));
        saldo += Cents(500);
        assert_eq!(saldo, Cents(3500));
        assert!((Cents(100) - Cents(200)).is_negative());
    }
}
